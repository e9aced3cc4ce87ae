use std::path::{Path, PathBuf};
use std::sync::Arc;

use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::hex;
use alloy::json_abi::JsonAbi;
use error_stack::{Report, ResultExt};

use crate::contracts::MockContract;
use crate::errors::{ChainError, ChainResult};

const LINK_PLACEHOLDER_PREFIX: &str = "__$";

/// The compiled output of a contract: Foundry `out/<Name>.sol/<Name>.json`,
/// Hardhat `artifacts/contracts/<Name>.sol/<Name>.json` or a flat
/// `build/contracts/<Name>.json`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledArtifact {
    pub abi: JsonAbi,
    pub bytecode: ArtifactBytecode,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ArtifactBytecode {
    /// Foundry: `{ "object": "0x..." }`
    Object { object: String },
    /// Hardhat and Brownie: plain hex string
    Hex(String),
}

impl ArtifactBytecode {
    pub fn as_hex(&self) -> &str {
        match self {
            ArtifactBytecode::Object { object } => object,
            ArtifactBytecode::Hex(hex) => hex,
        }
    }
}

impl CompiledArtifact {
    pub fn from_json(source: &str) -> ChainResult<Self> {
        serde_json::from_str(source)
            .map_err(|e| Report::new(ChainError::Artifact(format!("invalid artifact json: {e}"))))
    }

    /// Creation bytecode followed by the ABI-encoded constructor arguments.
    pub fn init_code(&self, constructor_args: &[DynSolValue]) -> ChainResult<Vec<u8>> {
        let bytecode = self.bytecode.as_hex();
        if bytecode.contains(LINK_PLACEHOLDER_PREFIX) {
            return Err(Report::new(ChainError::Artifact(
                "contract uses linked libraries, which mock deployment does not support".into(),
            )));
        }
        let mut init_code = hex::decode(bytecode)
            .map_err(|e| Report::new(ChainError::Artifact(format!("invalid contract bytecode: {e}"))))?;
        if init_code.is_empty() {
            return Err(Report::new(ChainError::Artifact(
                "artifact has no creation bytecode (abstract contract or interface?)".into(),
            )));
        }

        match &self.abi.constructor {
            Some(constructor) => {
                let mut encoded = constructor.abi_encode_input(constructor_args).map_err(|e| {
                    Report::new(ChainError::Abi(format!("failed to encode constructor args: {e}")))
                })?;
                init_code.append(&mut encoded);
            }
            None if !constructor_args.is_empty() => {
                return Err(Report::new(ChainError::Abi(
                    "constructor arguments provided, but abi has no constructor".into(),
                )));
            }
            None => {}
        }
        Ok(init_code)
    }
}

/// Finds compiled mock artifacts under one directory.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn candidates(&self, contract: MockContract) -> [PathBuf; 2] {
        let name = contract.type_name();
        [
            self.dir.join(format!("{name}.sol")).join(format!("{name}.json")),
            self.dir.join(format!("{name}.json")),
        ]
    }

    pub fn path(&self, contract: MockContract) -> ChainResult<PathBuf> {
        self.candidates(contract).into_iter().find(|path| path.is_file()).ok_or_else(|| {
            Report::new(ChainError::Artifact(format!(
                "no compiled artifact for {} in {}",
                contract.type_name(),
                self.dir.display()
            )))
        })
    }

    pub fn load(&self, contract: MockContract) -> ChainResult<CompiledArtifact> {
        let path = self.path(contract)?;
        let source = std::fs::read_to_string(&path)
            .map_err(|e| Report::new(ChainError::Artifact(e.to_string())))
            .attach_printable_lazy(|| format!("reading {}", path.display()))?;
        CompiledArtifact::from_json(&source).attach_printable_lazy(|| path.display().to_string())
    }

    pub fn abi(&self, contract: MockContract) -> ChainResult<Arc<JsonAbi>> {
        Ok(Arc::new(self.load(contract)?.abi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;

    const COORDINATOR_ABI: &str = r#"[{
        "type": "constructor",
        "stateMutability": "nonpayable",
        "inputs": [{ "name": "linkAddress", "type": "address", "internalType": "address" }]
    }]"#;

    fn write_artifact(path: &Path, body: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    #[test]
    fn test_loads_foundry_layout() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(
            &dir.path().join("LinkToken.sol/LinkToken.json"),
            r#"{ "abi": [], "bytecode": { "object": "0x6080" }, "deployedBytecode": { "object": "0x" } }"#,
        );

        let store = ArtifactStore::new(dir.path());
        let artifact = store.load(MockContract::LinkToken).unwrap();
        assert_eq!(artifact.init_code(&[]).unwrap(), vec![0x60, 0x80]);
    }

    #[test]
    fn test_loads_flat_layout_and_encodes_constructor() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(
            &dir.path().join("VRFCoordinatorMock.json"),
            &format!(r#"{{ "abi": {COORDINATOR_ABI}, "bytecode": "6080604052" }}"#),
        );

        let store = ArtifactStore::new(dir.path());
        let artifact = store.load(MockContract::VrfCoordinator).unwrap();
        let link = Address::repeat_byte(0x42);
        let init_code = artifact.init_code(&[DynSolValue::Address(link)]).unwrap();

        assert_eq!(init_code.len(), 5 + 32);
        assert_eq!(&init_code[..5], &[0x60, 0x80, 0x60, 0x40, 0x52]);
        assert_eq!(&init_code[5 + 12..], link.as_slice());
    }

    #[test]
    fn test_constructor_arity_is_checked() {
        let artifact = CompiledArtifact::from_json(&format!(
            r#"{{ "abi": {COORDINATOR_ABI}, "bytecode": "0x6080" }}"#
        ))
        .unwrap();
        assert!(artifact.init_code(&[]).is_err());

        let no_constructor =
            CompiledArtifact::from_json(r#"{ "abi": [], "bytecode": "0x6080" }"#).unwrap();
        let error = no_constructor
            .init_code(&[DynSolValue::Address(Address::ZERO)])
            .unwrap_err();
        assert!(matches!(error.current_context(), ChainError::Abi(_)));
    }

    #[test]
    fn test_rejects_unusable_bytecode() {
        let linked = CompiledArtifact::from_json(
            r#"{ "abi": [], "bytecode": "0x6080__$1234567890abcdef1234567890abcdef12$__" }"#,
        )
        .unwrap();
        assert!(matches!(linked.init_code(&[]).unwrap_err().current_context(), ChainError::Artifact(_)));

        let empty = CompiledArtifact::from_json(r#"{ "abi": [], "bytecode": "0x" }"#).unwrap();
        assert!(empty.init_code(&[]).is_err());
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let error = ArtifactStore::new(dir.path()).abi(MockContract::PriceFeed).unwrap_err();
        assert!(format!("{error:?}").contains("MockV3Aggregator"));
    }
}
