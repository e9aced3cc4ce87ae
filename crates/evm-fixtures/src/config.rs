use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use alloy::primitives::Address;
use error_stack::ResultExt;

use crate::constants::{
    DEFAULT_ARTIFACTS_DIR, DEFAULT_FORKED_NETWORKS, DEFAULT_KEYSTORE_DIR, DEFAULT_LOCAL_NETWORKS,
    DEFAULT_LOCAL_RPC_URL, DEFAULT_NETWORK, TEST_MNEMONIC,
};
use crate::contracts::MockContract;
use crate::deploy::MockDeployment;
use crate::errors::{FixtureError, FixtureErrorExt, FixtureResult};
use crate::network::{NetworkClass, NetworkClassifier};

/// Project configuration, usually read from `fixtures.toml`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FixtureConfig {
    /// `.env` file loaded before `${VAR}` values are expanded
    #[serde(default)]
    pub dotenv: Option<PathBuf>,
    #[serde(default)]
    pub environments: EnvironmentsConfig,
    #[serde(default)]
    pub wallets: WalletsConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub mocks: MockDeployment,
    #[serde(default)]
    pub networks: NetworksConfig,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnvironmentsConfig {
    pub local: Vec<String>,
    pub forked: Vec<String>,
}

impl Default for EnvironmentsConfig {
    fn default() -> Self {
        Self {
            local: DEFAULT_LOCAL_NETWORKS.iter().map(|n| n.to_string()).collect(),
            forked: DEFAULT_FORKED_NETWORKS.iter().map(|n| n.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WalletsConfig {
    pub from_key: Option<String>,
    pub mnemonic: Option<String>,
    pub keystore_dir: Option<String>,
    pub keystore_password: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub dir: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR) }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct NetworksConfig {
    #[serde(default)]
    pub default: Option<String>,
    #[serde(flatten)]
    pub networks: BTreeMap<String, NetworkConfig>,
}

/// Per-network section: an RPC endpoint plus contract addresses and any extra values.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct NetworkConfig {
    #[serde(default, alias = "host")]
    pub rpc_url: Option<String>,
    #[serde(flatten)]
    pub entries: BTreeMap<String, toml::Value>,
}

impl FixtureConfig {
    pub fn from_toml_str(source: &str) -> FixtureResult<Self> {
        toml::from_str(source)
            .change_context(FixtureError::Config)
            .attach_printable("Failed to parse fixture configuration")
    }

    /// Read a configuration file, loading its `.env` file if one is declared.
    pub fn from_path(path: impl AsRef<Path>) -> FixtureResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .change_context(FixtureError::Config)
            .attach_printable_lazy(|| format!("Unable to read {}", path.display()))?;
        let mut config = Self::from_toml_str(&source)
            .attach_printable_lazy(|| format!("In {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf);

        if let Some(dotenv) = &config.dotenv {
            let dotenv = config.resolve_path(dotenv);
            dotenvy::from_path(&dotenv)
                .change_context(FixtureError::Config)
                .attach_printable_lazy(|| format!("Unable to load {}", dotenv.display()))?;
        }
        Ok(config)
    }

    pub fn classifier(&self) -> NetworkClassifier {
        NetworkClassifier::new(
            self.environments.local.iter().cloned(),
            self.environments.forked.iter().cloned(),
        )
    }

    pub fn default_network(&self) -> &str {
        self.networks.default.as_deref().unwrap_or(DEFAULT_NETWORK)
    }

    pub fn network(&self, network: &str) -> Option<&NetworkConfig> {
        self.networks.networks.get(network)
    }

    /// Configured address of `contract` on `network`.
    ///
    /// `Ok(None)` when the network section or the entry is absent.
    pub fn contract_address(
        &self,
        network: &str,
        contract: MockContract,
    ) -> FixtureResult<Option<Address>> {
        let Some(value) = self.network_value(network, contract.name()) else {
            return Ok(None);
        };
        let Some(raw) = value.as_str() else {
            return Err(fixture_error!(
                FixtureError::Config,
                "networks.{network}.{} must be an address string",
                contract.name()
            ));
        };
        Address::from_str(raw.trim())
            .change_context(FixtureError::Config)
            .attach_printable_lazy(|| {
                format!("networks.{network}.{} is not a valid address: {raw}", contract.name())
            })
            .with_contract_info(contract.type_name(), None)
            .map(Some)
    }

    /// Any value of a network section, e.g. a VRF `keyhash` or `fee`
    pub fn network_value(&self, network: &str, key: &str) -> Option<&toml::Value> {
        self.network(network).and_then(|section| section.entries.get(key))
    }

    /// Endpoint for `network`; local and forked networks fall back to the default node URL.
    pub fn rpc_url(&self, network: &str) -> Option<String> {
        if let Some(url) = self.network(network).and_then(|n| n.rpc_url.as_deref()) {
            return expand_env(url);
        }
        match self.classifier().classify(network) {
            NetworkClass::LocalDev | NetworkClass::ForkedLocal => {
                Some(DEFAULT_LOCAL_RPC_URL.to_string())
            }
            NetworkClass::Live => None,
        }
    }

    /// Private key used on live networks, `None` when unset or empty
    pub fn private_key(&self) -> Option<String> {
        self.wallets.from_key.as_deref().and_then(expand_env)
    }

    pub fn mnemonic(&self) -> String {
        self.wallets
            .mnemonic
            .as_deref()
            .and_then(expand_env)
            .unwrap_or_else(|| TEST_MNEMONIC.to_string())
    }

    pub fn keystore_dir(&self) -> Option<PathBuf> {
        match self.wallets.keystore_dir.as_deref().and_then(expand_env) {
            Some(dir) => match dir.strip_prefix("~/") {
                Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
                None => Some(self.resolve_path(Path::new(&dir))),
            },
            None => dirs::home_dir().map(|home| home.join(DEFAULT_KEYSTORE_DIR)),
        }
    }

    pub fn keystore_password(&self) -> Option<String> {
        self.wallets.keystore_password.as_deref().and_then(expand_env)
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.resolve_path(&self.artifacts.dir)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Expand `${VAR}` / `$VAR` from the environment; other values are returned trimmed.
pub fn expand_env(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let var = trimmed
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .or_else(|| trimmed.strip_prefix('$'));
    match var {
        Some(name) => std::env::var(name).ok().filter(|value| !value.trim().is_empty()),
        None if trimmed.is_empty() => None,
        None => Some(trimmed.to_string()),
    }
}
