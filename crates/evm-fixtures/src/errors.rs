use alloy::primitives::{Address, TxHash};
use error_stack::{Context, Report};
use std::fmt;

use crate::network::NetworkClass;

/// Error kinds surfaced by fixture operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureError {
    /// No usable signing account could be resolved
    AccountResolution,
    /// Requested contract name is not a known mock
    UnknownContract,
    /// Forked or live network has no configured address for the contract
    MissingNetworkConfig,
    /// A mock deployment transaction failed
    Deployment,
    /// Funding transfer failed or was not confirmed
    Transfer,
    /// Configuration could not be read or is malformed
    Config,
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureError::AccountResolution => write!(f, "Unable to resolve a signing account"),
            FixtureError::UnknownContract => write!(f, "Unknown contract"),
            FixtureError::MissingNetworkConfig => {
                write!(f, "Missing contract address in network configuration")
            }
            FixtureError::Deployment => write!(f, "Mock deployment failed"),
            FixtureError::Transfer => write!(f, "Token transfer failed"),
            FixtureError::Config => write!(f, "Invalid fixture configuration"),
        }
    }
}

impl Context for FixtureError {}

pub type FixtureResult<T> = Result<T, Report<FixtureError>>;

/// Failures reported by a chain runtime
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("signer error: {0}")]
    Signer(String),
    #[error("keystore error: {0}")]
    Keystore(String),
    #[error("artifact error: {0}")]
    Artifact(String),
    #[error("abi error: {0}")]
    Abi(String),
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error("timed out waiting for {0}")]
    Timeout(String),
}

pub type ChainResult<T> = Result<T, Report<ChainError>>;

/// Contract information for deployment/resolution errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInfo {
    pub name: String,
    pub address: Option<Address>,
}

impl fmt::Display for ContractInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Contract: {}", self.name)?;
        if let Some(address) = &self.address {
            write!(f, " at {}", address)?;
        }
        Ok(())
    }
}

/// Active network at the time of the failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    pub network: String,
    pub class: NetworkClass,
}

impl fmt::Display for NetworkInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Network: {} ({})", self.network, self.class)
    }
}

pub trait FixtureErrorExt {
    /// Attach contract information
    fn with_contract_info(self, name: impl Into<String>, address: Option<Address>) -> Self;

    /// Attach the active network and its classification
    fn with_network_info(self, network: impl Into<String>, class: NetworkClass) -> Self;
}

impl<T, C> FixtureErrorExt for Result<T, Report<C>> {
    fn with_contract_info(self, name: impl Into<String>, address: Option<Address>) -> Self {
        self.map_err(|e| e.attach(ContractInfo { name: name.into(), address }))
    }

    fn with_network_info(self, network: impl Into<String>, class: NetworkClass) -> Self {
        self.map_err(|e| e.attach(NetworkInfo { network: network.into(), class }))
    }
}

/// Helper macro for creating fixture errors
#[macro_export]
macro_rules! fixture_error {
    ($error:expr, $($arg:tt)*) => {{
        error_stack::Report::new($error).attach_printable(format!($($arg)*))
    }};
}
