#[macro_use]
extern crate hiro_system_kit;

#[macro_use]
extern crate serde_derive;

#[macro_use]
pub mod errors;

pub mod accounts;
pub mod artifacts;
pub mod config;
pub mod constants;
pub mod context;
pub mod contracts;
pub mod deploy;
pub mod funding;
pub mod network;
mod resolver;
pub mod rpc;
pub mod runtime;

#[cfg(test)]
mod tests;

pub use accounts::{Account, AccountRequest, AccountSource};
pub use config::FixtureConfig;
pub use context::Context;
pub use contracts::{ContractHandle, ContractRegistry, HandleOrigin, MockArgs, MockContract};
pub use deploy::{DeployedFixtures, MockDeployment};
pub use errors::{ChainError, FixtureError, FixtureResult};
pub use funding::{FundingOptions, FundingReceipt};
pub use network::{NetworkClass, NetworkClassifier};
pub use rpc::EvmRuntime;
pub use runtime::{ChainRuntime, ConfirmedTransaction};

/// Resolves accounts and contracts for the runtime's active network and
/// provisions the mock fixture set.
///
/// Owns the registry of mocks deployed through it. Resolution may deploy, so
/// operations take `&mut self`; a `Fixtures` is meant for one caller at a time.
pub struct Fixtures<R: ChainRuntime> {
    runtime: R,
    config: FixtureConfig,
    classifier: NetworkClassifier,
    registry: ContractRegistry,
    ctx: Context,
}

impl<R: ChainRuntime> Fixtures<R> {
    pub fn new(runtime: R, config: FixtureConfig, ctx: Context) -> Self {
        let classifier = config.classifier();
        Self { runtime, config, classifier, registry: ContractRegistry::new(), ctx }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    pub fn active_network(&self) -> &str {
        self.runtime.active_network()
    }

    pub fn network_class(&self) -> NetworkClass {
        self.classifier.classify(self.runtime.active_network())
    }
}
