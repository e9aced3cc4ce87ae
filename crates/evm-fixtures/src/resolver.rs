use error_stack::ResultExt;

use crate::contracts::{ContractHandle, MockContract};
use crate::errors::{FixtureError, FixtureErrorExt, FixtureResult};
use crate::network::NetworkClass;
use crate::runtime::ChainRuntime;
use crate::Fixtures;

impl<R: ChainRuntime> Fixtures<R> {
    /// Resolve a logical contract name (`eth_usd_price_feed`, `vrf_coordinator`,
    /// `link_token`) to a usable instance.
    ///
    /// On a local development network this returns the most recent mock,
    /// deploying the *whole* fixture set first when the requested mock has never
    /// been deployed. On forked and live networks the configured address is
    /// bound to the mock's ABI instead.
    pub fn resolve_contract(&mut self, name: &str) -> FixtureResult<ContractHandle> {
        let contract = MockContract::from_name(name)?;
        self.resolve_mock(contract)
    }

    pub fn resolve_mock(&mut self, contract: MockContract) -> FixtureResult<ContractHandle> {
        let network = self.runtime.active_network().to_string();
        let class = self.classifier.classify(&network);
        match class {
            NetworkClass::LocalDev => {
                if !self.registry.is_deployed(contract) {
                    self.deploy_default_fixtures()?;
                }
                self.registry.latest(contract).cloned().ok_or_else(|| {
                    fixture_error!(
                        FixtureError::Deployment,
                        "{} missing from registry after deployment",
                        contract.type_name()
                    )
                })
            }
            NetworkClass::ForkedLocal | NetworkClass::Live => {
                let Some(address) = self
                    .config
                    .contract_address(&network, contract)
                    .with_network_info(&network, class)?
                else {
                    return Err::<ContractHandle, _>(fixture_error!(
                        FixtureError::MissingNetworkConfig,
                        "no address for '{}' under networks.{}",
                        contract.name(),
                        network
                    ))
                    .with_network_info(&network, class)
                    .with_contract_info(contract.type_name(), None);
                };

                let handle = self
                    .runtime
                    .contract_at(contract, address)
                    .change_context(FixtureError::Config)
                    .attach_printable_lazy(|| {
                        format!("Unable to bind {} to {}", contract.type_name(), address)
                    })
                    .with_contract_info(contract.type_name(), Some(address))?;

                self.ctx.try_log(|logger| {
                    debug!(logger, "Using {} at {} on {}", handle.name(), address, network)
                });
                Ok(handle)
            }
        }
    }
}
