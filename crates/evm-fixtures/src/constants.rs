pub const DEFAULT_LOCAL_NETWORKS: [&str; 2] = ["development", "ganache-local2"];
pub const DEFAULT_FORKED_NETWORKS: [&str; 2] = ["mainnet-fork", "mainnet-fork-dev"];
pub const DEFAULT_NETWORK: &str = "development";
pub const DEFAULT_LOCAL_RPC_URL: &str = "http://127.0.0.1:8545";

// Local accounts
pub const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";
pub const DERIVATION_PATH_PREFIX: &str = "m/44'/60'/0'/0";
pub const DEFAULT_KEYSTORE_DIR: &str = ".foundry/keystores";

// Artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "out";

// Mock fixture defaults
pub const DEFAULT_DECIMALS: u8 = 8;
// 2000 USD per ETH with 8 decimals
pub const DEFAULT_INITIAL_VALUE: i64 = 200_000_000_000;

// Funding
// 0.1 LINK
pub const DEFAULT_FUNDING_AMOUNT: u64 = 100_000_000_000_000_000;
pub const FUNDING_CONFIRMATIONS: u64 = 1;

// Confirmation polling
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
