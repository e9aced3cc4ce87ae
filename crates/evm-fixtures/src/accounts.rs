use std::path::{Path, PathBuf};
use std::str::FromStr;

use alloy::primitives::Address;
use alloy_signer_local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use error_stack::{Report, ResultExt};

use crate::constants::DERIVATION_PATH_PREFIX;
use crate::errors::{ChainError, ChainResult, FixtureError, FixtureErrorExt, FixtureResult};
use crate::network::NetworkClass;
use crate::runtime::ChainRuntime;
use crate::Fixtures;

/// Where a signing account came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountSource {
    /// Development account by position
    Local(usize),
    /// Encrypted keystore entry
    Keystore(String),
    /// Raw private key from configuration
    PrivateKey,
}

/// A signing identity
#[derive(Debug, Clone)]
pub struct Account {
    pub address: Address,
    pub signer: PrivateKeySigner,
    pub source: AccountSource,
}

impl Account {
    pub fn new(signer: PrivateKeySigner, source: AccountSource) -> Self {
        Self { address: signer.address(), signer, source }
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.source == other.source
    }
}

impl Eq for Account {}

/// Explicit account selection; an empty request falls back to the network default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountRequest {
    /// Position among the node's development accounts, checked first
    pub index: Option<usize>,
    /// Keystore identifier, checked when no index is given
    pub id: Option<String>,
}

impl AccountRequest {
    pub fn index(index: usize) -> Self {
        Self { index: Some(index), id: None }
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self { index: None, id: Some(id.into()) }
    }
}

impl<R: ChainRuntime> Fixtures<R> {
    /// Pick the account to sign with.
    ///
    /// Order: explicit index, explicit keystore id, development account 0 on
    /// local and forked networks, configured private key on live networks.
    pub fn resolve_account(&self, request: &AccountRequest) -> FixtureResult<Account> {
        if let Some(index) = request.index {
            return self
                .runtime
                .local_account(index)
                .change_context(FixtureError::AccountResolution)
                .attach_printable_lazy(|| format!("No local account at index {index}"));
        }
        if let Some(id) = &request.id {
            return self
                .runtime
                .load_account(id)
                .change_context(FixtureError::AccountResolution)
                .attach_printable_lazy(|| format!("Unable to load stored account '{id}'"));
        }

        let network = self.runtime.active_network();
        let class = self.classifier.classify(network);
        if class.is_local() {
            return self
                .runtime
                .local_account(0)
                .change_context(FixtureError::AccountResolution)
                .attach_printable("No default development account")
                .with_network_info(network, class);
        }

        let Some(private_key) = self.config.private_key() else {
            return Err::<Account, _>(fixture_error!(
                FixtureError::AccountResolution,
                "No private key configured (wallets.from_key) for live network '{network}'"
            ))
            .with_network_info(network, NetworkClass::Live);
        };
        self.runtime
            .account_from_key(&private_key)
            .change_context(FixtureError::AccountResolution)
            .attach_printable("Configured private key is not usable")
            .with_network_info(network, class)
    }

    /// Account used when nothing explicit is requested
    pub fn default_account(&self) -> FixtureResult<Account> {
        self.resolve_account(&AccountRequest::default())
    }
}

pub fn mnemonic_to_signer(mnemonic: &str, index: usize) -> ChainResult<PrivateKeySigner> {
    let derivation_path = format!("{DERIVATION_PATH_PREFIX}/{index}");
    MnemonicBuilder::<English>::default()
        .phrase(mnemonic)
        .derivation_path(&derivation_path)
        .map_err(|e| Report::new(ChainError::Signer(format!("invalid derivation path: {e}"))))?
        .build()
        .map_err(|e| {
            Report::new(ChainError::Signer(format!(
                "failed to build signer from mnemonic at {derivation_path}: {e}"
            )))
        })
}

pub fn private_key_to_signer(private_key: &str) -> ChainResult<PrivateKeySigner> {
    PrivateKeySigner::from_str(private_key.trim())
        .map_err(|e| Report::new(ChainError::Signer(format!("invalid private key: {e}"))))
}

/// Keystore file for `account`: either a path to an existing file, or a name
/// (with or without `.json`) inside `keystore_dir`.
pub fn resolve_keystore_path(account: &str, keystore_dir: Option<&Path>) -> ChainResult<PathBuf> {
    let direct = PathBuf::from(account);
    if direct.is_absolute() || account.contains(std::path::MAIN_SEPARATOR) {
        return if direct.is_file() {
            Ok(direct)
        } else {
            Err(Report::new(ChainError::Keystore(format!(
                "keystore file not found: {}",
                direct.display()
            ))))
        };
    }

    let Some(dir) = keystore_dir else {
        return Err(Report::new(ChainError::Keystore(
            "no keystore directory available".to_string(),
        )));
    };
    [dir.join(account), dir.join(format!("{account}.json"))]
        .into_iter()
        .find(|path| path.is_file())
        .ok_or_else(|| {
            Report::new(ChainError::Keystore(format!(
                "no keystore named '{account}' in {}",
                dir.display()
            )))
        })
}

pub fn keystore_to_signer(path: &Path, password: &str) -> ChainResult<PrivateKeySigner> {
    PrivateKeySigner::decrypt_keystore(path, password).map_err(|e| {
        Report::new(ChainError::Keystore(format!(
            "failed to decrypt keystore {}: {e}",
            path.display()
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TEST_MNEMONIC;

    const ANVIL_KEY_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_mnemonic_derivation_matches_dev_node_accounts() {
        let first = mnemonic_to_signer(TEST_MNEMONIC, 0).unwrap();
        assert_eq!(
            first.address(),
            Address::from_str("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap()
        );
        let second = mnemonic_to_signer(TEST_MNEMONIC, 1).unwrap();
        assert_eq!(
            second.address(),
            Address::from_str("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap()
        );
    }

    #[test]
    fn test_private_key_signer() {
        let signer = private_key_to_signer(ANVIL_KEY_0).unwrap();
        assert_eq!(signer.address(), mnemonic_to_signer(TEST_MNEMONIC, 0).unwrap().address());
        assert!(private_key_to_signer("0xnot-a-key").is_err());
    }

    #[test]
    fn test_resolve_keystore_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("deployer.json"), "{}").unwrap();
        std::fs::write(dir.path().join("ops"), "{}").unwrap();

        assert_eq!(
            resolve_keystore_path("deployer", Some(dir.path())).unwrap(),
            dir.path().join("deployer.json")
        );
        assert_eq!(resolve_keystore_path("ops", Some(dir.path())).unwrap(), dir.path().join("ops"));

        let full = dir.path().join("deployer.json");
        assert_eq!(resolve_keystore_path(full.to_str().unwrap(), None).unwrap(), full);

        assert!(resolve_keystore_path("missing", Some(dir.path())).is_err());
        assert!(resolve_keystore_path("deployer", None).is_err());
    }

    #[test]
    fn test_keystore_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = rand::thread_rng();
        let (signer, name) = PrivateKeySigner::new_keystore(dir.path(), &mut rng, "hunter2", None)
            .unwrap();

        let path = resolve_keystore_path(&name, Some(dir.path())).unwrap();
        let loaded = keystore_to_signer(&path, "hunter2").unwrap();
        assert_eq!(loaded.address(), signer.address());
        assert!(keystore_to_signer(&path, "wrong").is_err());
    }
}
