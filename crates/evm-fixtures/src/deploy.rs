use alloy::primitives::I256;
use error_stack::ResultExt;

use crate::accounts::{Account, AccountRequest};
use crate::constants::{DEFAULT_DECIMALS, DEFAULT_INITIAL_VALUE};
use crate::contracts::{ContractHandle, MockArgs};
use crate::errors::{FixtureError, FixtureErrorExt, FixtureResult};
use crate::runtime::ChainRuntime;
use crate::Fixtures;

/// Price feed parameters of the mock fixture set
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MockDeployment {
    /// Decimals reported by the price feed
    pub decimals: u8,
    /// Initial answer of the price feed, scaled by `decimals`
    pub initial_value: i64,
}

impl Default for MockDeployment {
    fn default() -> Self {
        Self { decimals: DEFAULT_DECIMALS, initial_value: DEFAULT_INITIAL_VALUE }
    }
}

/// Handles of one full fixture deployment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployedFixtures {
    pub price_feed: ContractHandle,
    pub link_token: ContractHandle,
    pub vrf_coordinator: ContractHandle,
}

impl<R: ChainRuntime> Fixtures<R> {
    /// Deploy price feed, token and coordinator, in that order.
    ///
    /// The coordinator is constructed with the token's address. Each mock is
    /// recorded as soon as it is deployed, so when a later step fails the
    /// earlier mocks stay on chain and stay resolvable.
    pub fn deploy_fixtures(&mut self, mocks: &MockDeployment) -> FixtureResult<DeployedFixtures> {
        let account = self.resolve_account(&AccountRequest::default())?;
        self.ctx.try_log(|logger| {
            info!(
                logger,
                "Deploying mocks on {} from {}",
                self.runtime.active_network(),
                account.address
            )
        });

        let initial_answer = I256::try_from(mocks.initial_value).map_err(|_| {
            fixture_error!(
                FixtureError::Deployment,
                "initial value {} out of range",
                mocks.initial_value
            )
        })?;

        let price_feed = self.deploy_mock(
            &MockArgs::PriceFeed { decimals: mocks.decimals, initial_answer },
            &account,
        )?;
        let link_token = self.deploy_mock(&MockArgs::LinkToken, &account)?;
        let vrf_coordinator = self
            .deploy_mock(&MockArgs::VrfCoordinator { link_token: link_token.address }, &account)?;

        self.ctx.try_log(|logger| info!(logger, "Deployed!"));
        Ok(DeployedFixtures { price_feed, link_token, vrf_coordinator })
    }

    /// Same as [`Fixtures::deploy_fixtures`] with the `[mocks]` configuration
    pub fn deploy_default_fixtures(&mut self) -> FixtureResult<DeployedFixtures> {
        let mocks = self.config.mocks.clone();
        self.deploy_fixtures(&mocks)
    }

    fn deploy_mock(&mut self, args: &MockArgs, account: &Account) -> FixtureResult<ContractHandle> {
        let contract = args.contract();
        let handle = self
            .runtime
            .deploy(args, account)
            .change_context(FixtureError::Deployment)
            .attach_printable_lazy(|| format!("Failed to deploy {}", contract.type_name()))
            .with_contract_info(contract.type_name(), None)?;

        self.ctx.try_log(|logger| {
            debug!(logger, "{} deployed at {}", handle.name(), handle.address)
        });
        self.registry.record(handle.clone());
        Ok(handle)
    }
}
