

use crate::{Context, FixtureConfig, Fixtures};
use mock_runtime::MockRuntime;

pub const LIVE_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub const LIVE_CONFIG: &str = r#"
    [wallets]
    from_key = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"

    [networks.live-mainnet]
    eth_usd_price_feed = "0x5f4eC3Df9cbd43714FE2740f5E3616155c5b8419"
    link_token = "0x514910771AF9Ca656af840dff83E8264EcF986CA"

    [networks.mainnet-fork]
    link_token = "0x514910771AF9Ca656af840dff83E8264EcF986CA"
"#;

/// Fixtures over an in-memory runtime on `network`, with `config` as fixtures.toml
pub fn fixtures_on(network: &str, config: &str) -> Fixtures<MockRuntime> {
    fixtures_with(MockRuntime::new(network), config)
}

pub fn fixtures_with(runtime: MockRuntime, config: &str) -> Fixtures<MockRuntime> {
    let config = FixtureConfig::from_toml_str(config).unwrap();
    Fixtures::new(runtime, config, Context::empty())
}
