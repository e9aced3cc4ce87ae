use std::collections::BTreeMap;
use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, I256, U256};
use error_stack::Report;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::errors::{ContractInfo, FixtureError, FixtureResult};

/// Contracts that have a local mock stand-in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, AsRefStr,
)]
pub enum MockContract {
    #[strum(serialize = "eth_usd_price_feed")]
    PriceFeed,
    #[strum(serialize = "link_token")]
    LinkToken,
    #[strum(serialize = "vrf_coordinator")]
    VrfCoordinator,
}

impl MockContract {
    /// Resolve a logical contract name such as `eth_usd_price_feed`
    pub fn from_name(name: &str) -> FixtureResult<Self> {
        name.parse::<MockContract>().map_err(|_| {
            Report::new(FixtureError::UnknownContract)
                .attach_printable(format!(
                    "'{}' is not one of: {}",
                    name,
                    MockContract::iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
                ))
                .attach(ContractInfo { name: name.to_string(), address: None })
        })
    }

    /// Logical name used in configuration
    pub fn name(&self) -> &'static str {
        match self {
            MockContract::PriceFeed => "eth_usd_price_feed",
            MockContract::LinkToken => "link_token",
            MockContract::VrfCoordinator => "vrf_coordinator",
        }
    }

    /// Contract type name, also the compiled artifact name
    pub fn type_name(&self) -> &'static str {
        match self {
            MockContract::PriceFeed => "MockV3Aggregator",
            MockContract::LinkToken => "LinkToken",
            MockContract::VrfCoordinator => "VRFCoordinatorMock",
        }
    }
}

/// Constructor inputs of each mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockArgs {
    PriceFeed { decimals: u8, initial_answer: I256 },
    LinkToken,
    VrfCoordinator { link_token: Address },
}

impl MockArgs {
    pub fn contract(&self) -> MockContract {
        match self {
            MockArgs::PriceFeed { .. } => MockContract::PriceFeed,
            MockArgs::LinkToken => MockContract::LinkToken,
            MockArgs::VrfCoordinator { .. } => MockContract::VrfCoordinator,
        }
    }

    /// ABI values in constructor order
    pub fn to_constructor_values(&self) -> Vec<DynSolValue> {
        match self {
            MockArgs::PriceFeed { decimals, initial_answer } => vec![
                DynSolValue::Uint(U256::from(*decimals), 8),
                DynSolValue::Int(*initial_answer, 256),
            ],
            MockArgs::LinkToken => vec![],
            MockArgs::VrfCoordinator { link_token } => vec![DynSolValue::Address(*link_token)],
        }
    }
}

/// How a handle came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOrigin {
    /// Mock deployed by this process
    Deployed,
    /// Bound to a configured address on a forked or live network
    Proxy,
}

/// A contract instance: address, ABI and type name.
#[derive(Debug, Clone)]
pub struct ContractHandle {
    pub contract: MockContract,
    pub address: Address,
    pub abi: Arc<JsonAbi>,
    pub origin: HandleOrigin,
}

impl ContractHandle {
    pub fn deployed(contract: MockContract, address: Address, abi: Arc<JsonAbi>) -> Self {
        Self { contract, address, abi, origin: HandleOrigin::Deployed }
    }

    pub fn proxy(contract: MockContract, address: Address, abi: Arc<JsonAbi>) -> Self {
        Self { contract, address, abi, origin: HandleOrigin::Proxy }
    }

    pub fn name(&self) -> &'static str {
        self.contract.type_name()
    }
}

impl PartialEq for ContractHandle {
    fn eq(&self, other: &Self) -> bool {
        self.contract == other.contract
            && self.address == other.address
            && self.origin == other.origin
    }
}

impl Eq for ContractHandle {}

/// Deployed mock instances per contract, in deployment order.
///
/// The most recent instance is the last one recorded. Nothing is ever removed
/// except through [`ContractRegistry::clear`], which only forgets the handles;
/// the contracts stay on chain.
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    deployments: BTreeMap<MockContract, Vec<ContractHandle>>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, handle: ContractHandle) {
        self.deployments.entry(handle.contract).or_default().push(handle);
    }

    pub fn latest(&self, contract: MockContract) -> Option<&ContractHandle> {
        self.deployments.get(&contract).and_then(|handles| handles.last())
    }

    pub fn deployment_count(&self, contract: MockContract) -> usize {
        self.deployments.get(&contract).map(Vec::len).unwrap_or(0)
    }

    pub fn is_deployed(&self, contract: MockContract) -> bool {
        self.deployment_count(contract) > 0
    }

    pub fn deployments(&self, contract: MockContract) -> &[ContractHandle] {
        self.deployments.get(&contract).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.deployments.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(contract: MockContract, byte: u8) -> ContractHandle {
        ContractHandle::deployed(contract, Address::repeat_byte(byte), Arc::new(JsonAbi::default()))
    }

    #[test]
    fn test_from_name_known_contracts() {
        assert_eq!(MockContract::from_name("eth_usd_price_feed").unwrap(), MockContract::PriceFeed);
        assert_eq!(MockContract::from_name("link_token").unwrap(), MockContract::LinkToken);
        assert_eq!(MockContract::from_name("vrf_coordinator").unwrap(), MockContract::VrfCoordinator);
    }

    #[test]
    fn test_from_name_unknown_contract() {
        let error = MockContract::from_name("not_a_real_contract").unwrap_err();
        assert_eq!(error.current_context(), &FixtureError::UnknownContract);
        let info = error.downcast_ref::<ContractInfo>().unwrap();
        assert_eq!(info.name, "not_a_real_contract");
        assert!(format!("{:?}", error).contains("eth_usd_price_feed"));
    }

    #[test]
    fn test_names_round_trip_through_display() {
        for contract in MockContract::iter() {
            assert_eq!(contract.to_string(), contract.name());
            assert_eq!(contract.as_ref(), contract.name());
        }
        assert_eq!(MockContract::VrfCoordinator.type_name(), "VRFCoordinatorMock");
    }

    #[test]
    fn test_constructor_values() {
        let link_token = Address::repeat_byte(0x11);
        let values = MockArgs::VrfCoordinator { link_token }.to_constructor_values();
        assert_eq!(values, vec![DynSolValue::Address(link_token)]);
        assert!(MockArgs::LinkToken.to_constructor_values().is_empty());

        let price_feed = MockArgs::PriceFeed {
            decimals: 8,
            initial_answer: I256::try_from(200_000_000_000i64).unwrap(),
        };
        assert_eq!(price_feed.contract(), MockContract::PriceFeed);
        assert_eq!(price_feed.to_constructor_values()[0], DynSolValue::Uint(U256::from(8u8), 8));
    }

    #[test]
    fn test_registry_latest_is_last_recorded() {
        let mut registry = ContractRegistry::new();
        assert!(!registry.is_deployed(MockContract::LinkToken));
        assert!(registry.latest(MockContract::LinkToken).is_none());

        registry.record(handle(MockContract::LinkToken, 1));
        registry.record(handle(MockContract::LinkToken, 2));
        registry.record(handle(MockContract::PriceFeed, 3));

        assert_eq!(registry.deployment_count(MockContract::LinkToken), 2);
        assert_eq!(
            registry.latest(MockContract::LinkToken).unwrap().address,
            Address::repeat_byte(2)
        );
        assert!(!registry.is_deployed(MockContract::VrfCoordinator));
        assert!(registry.deployments(MockContract::VrfCoordinator).is_empty());

        registry.clear();
        assert_eq!(registry.deployment_count(MockContract::LinkToken), 0);
    }

    #[test]
    fn test_handle_equality_ignores_abi() {
        let a = handle(MockContract::PriceFeed, 7);
        let mut b = a.clone();
        b.abi = Arc::new(JsonAbi::default());
        assert_eq!(a, b);

        let proxy = ContractHandle::proxy(MockContract::PriceFeed, a.address, a.abi.clone());
        assert_ne!(a, proxy);
        assert_eq!(proxy.name(), "MockV3Aggregator");
    }
}
