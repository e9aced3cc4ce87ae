use std::path::PathBuf;
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use alloy::json_abi::JsonAbi;
use alloy::network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;
use error_stack::{Report, ResultExt};
use url::Url;

use crate::accounts::{
    keystore_to_signer, mnemonic_to_signer, private_key_to_signer, resolve_keystore_path, Account,
    AccountSource,
};
use crate::artifacts::ArtifactStore;
use crate::config::FixtureConfig;
use crate::constants::{
    DEFAULT_CONFIRMATION_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_MS, TEST_MNEMONIC,
};
use crate::context::Context;
use crate::contracts::{ContractHandle, MockArgs, MockContract};
use crate::errors::{ChainError, ChainResult, FixtureError, FixtureResult};
use crate::runtime::{ChainRuntime, ConfirmedTransaction};
use crate::Fixtures;

sol! {
    interface IERC20 {
        function transfer(address to, uint256 value) external returns (bool);
    }
}

fn rpc_error(method: &str, e: impl std::fmt::Display) -> Report<ChainError> {
    Report::new(ChainError::Rpc(format!("{method}: {e}")))
}

/// [`ChainRuntime`] backed by a JSON-RPC node.
///
/// Development accounts are derived from a mnemonic (the standard dev mnemonic
/// unless configured), keystore accounts are decrypted from disk, and mocks
/// are deployed from compiled artifacts.
pub struct EvmRuntime {
    network: String,
    url: Url,
    artifacts: ArtifactStore,
    mnemonic: String,
    keystore_dir: Option<PathBuf>,
    keystore_password: Option<String>,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl EvmRuntime {
    pub fn new(network: &str, rpc_url: &str, artifacts: ArtifactStore) -> ChainResult<Self> {
        let url = Url::parse(rpc_url)
            .map_err(|e| Report::new(ChainError::Rpc(format!("invalid rpc url {rpc_url}: {e}"))))?;
        Ok(Self {
            network: network.to_string(),
            url,
            artifacts,
            mnemonic: TEST_MNEMONIC.to_string(),
            keystore_dir: None,
            keystore_password: None,
            confirmation_timeout: Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        })
    }

    /// Runtime for `network`, or the configured default network.
    pub fn from_config(config: &FixtureConfig, network: Option<&str>) -> FixtureResult<Self> {
        let network = network.unwrap_or_else(|| config.default_network());
        let Some(rpc_url) = config.rpc_url(network) else {
            return Err(fixture_error!(
                FixtureError::Config,
                "no rpc_url configured for network '{network}'"
            ));
        };
        let runtime = Self::new(network, &rpc_url, ArtifactStore::new(config.artifacts_dir()))
            .change_context(FixtureError::Config)?
            .with_mnemonic(config.mnemonic())
            .with_keystore(config.keystore_dir(), config.keystore_password());
        Ok(runtime)
    }

    pub fn with_mnemonic(mut self, mnemonic: impl Into<String>) -> Self {
        self.mnemonic = mnemonic.into();
        self
    }

    pub fn with_keystore(mut self, dir: Option<PathBuf>, password: Option<String>) -> Self {
        self.keystore_dir = dir;
        self.keystore_password = password;
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn provider(&self) -> impl Provider {
        ProviderBuilder::new().on_http(self.url.clone())
    }

    fn wallet_provider(&self, sender: &Account) -> impl Provider {
        let wallet = EthereumWallet::from(sender.signer.clone());
        ProviderBuilder::new().wallet(wallet).on_http(self.url.clone())
    }

    fn send_transaction(&self, sender: &Account, tx: TransactionRequest) -> ChainResult<TxHash> {
        let provider = self.wallet_provider(sender);
        hiro_system_kit::nestable_block_on(async move {
            let pending = provider
                .send_transaction(tx)
                .await
                .map_err(|e| rpc_error("eth_sendRawTransaction", e))?;
            Ok::<_, Report<ChainError>>(*pending.tx_hash())
        })
        .attach_printable_lazy(|| format!("sender {}", sender.address))
    }
}

impl ChainRuntime for EvmRuntime {
    fn active_network(&self) -> &str {
        &self.network
    }

    fn local_account(&self, index: usize) -> ChainResult<Account> {
        let signer = mnemonic_to_signer(&self.mnemonic, index)?;
        Ok(Account::new(signer, AccountSource::Local(index)))
    }

    fn load_account(&self, id: &str) -> ChainResult<Account> {
        let path = resolve_keystore_path(id, self.keystore_dir.as_deref())?;
        let Some(password) = &self.keystore_password else {
            return Err(Report::new(ChainError::Keystore(format!(
                "no password available to unlock keystore '{id}' (wallets.keystore_password)"
            ))));
        };
        let signer = keystore_to_signer(&path, password)?;
        Ok(Account::new(signer, AccountSource::Keystore(id.to_string())))
    }

    fn account_from_key(&self, private_key: &str) -> ChainResult<Account> {
        let signer = private_key_to_signer(private_key)?;
        Ok(Account::new(signer, AccountSource::PrivateKey))
    }

    fn abi(&self, contract: MockContract) -> ChainResult<Arc<JsonAbi>> {
        self.artifacts.abi(contract)
    }

    fn deploy(&self, args: &MockArgs, sender: &Account) -> ChainResult<ContractHandle> {
        let contract = args.contract();
        let artifact = self.artifacts.load(contract)?;
        let init_code = artifact.init_code(&args.to_constructor_values())?;

        let tx = TransactionRequest::default()
            .with_from(sender.address)
            .with_deploy_code(init_code);
        let tx_hash = self.send_transaction(sender, tx)?;
        // Inclusion is enough for a deployment; only funding waits for later blocks.
        let confirmed = self.wait_for_confirmations(tx_hash, 0)?;
        if !confirmed.success {
            return Err(Report::new(ChainError::Reverted(tx_hash))
                .attach_printable(format!("deploying {}", contract.type_name())));
        }
        let Some(address) = confirmed.contract_address else {
            return Err(Report::new(ChainError::Rpc(format!(
                "receipt of {tx_hash} has no contract address"
            ))));
        };
        Ok(ContractHandle::deployed(contract, address, Arc::new(artifact.abi)))
    }

    fn transfer(
        &self,
        token: &ContractHandle,
        to: Address,
        amount: U256,
        sender: &Account,
    ) -> ChainResult<TxHash> {
        let call = IERC20::transferCall { to, value: amount };
        let tx = TransactionRequest::default()
            .with_from(sender.address)
            .with_to(token.address)
            .with_input(call.abi_encode());
        self.send_transaction(sender, tx)
    }

    fn wait_for_confirmations(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> ChainResult<ConfirmedTransaction> {
        let provider = self.provider();
        let deadline = Instant::now() + self.confirmation_timeout;
        hiro_system_kit::nestable_block_on(async move {
            loop {
                let receipt = provider
                    .get_transaction_receipt(tx_hash)
                    .await
                    .map_err(|e| rpc_error("eth_getTransactionReceipt", e))?;
                if let Some(receipt) = receipt {
                    if let Some(block_number) = receipt.block_number {
                        let head = provider
                            .get_block_number()
                            .await
                            .map_err(|e| rpc_error("eth_blockNumber", e))?;
                        if is_confirmed(head, block_number, confirmations) {
                            return Ok::<_, Report<ChainError>>(ConfirmedTransaction {
                                tx_hash,
                                block_number,
                                success: ReceiptResponse::status(&receipt),
                                contract_address: receipt.contract_address,
                            });
                        }
                    }
                }
                if Instant::now() >= deadline {
                    return Err(Report::new(ChainError::Timeout(format!(
                        "{confirmations} confirmation(s) of {tx_hash}"
                    ))));
                }
                sleep(self.poll_interval);
            }
        })
    }
}

/// `confirmations` blocks have been mined on top of the one at `block`.
pub(crate) fn is_confirmed(head: u64, block: u64, confirmations: u64) -> bool {
    head >= block.saturating_add(confirmations)
}

impl Fixtures<EvmRuntime> {
    /// Fixtures connected to `network` (or the configured default) over JSON-RPC
    pub fn connect(
        config: FixtureConfig,
        network: Option<&str>,
        ctx: Context,
    ) -> FixtureResult<Self> {
        let runtime = EvmRuntime::from_config(&config, network)?;
        ctx.try_log(|logger| {
            info!(logger, "Connected to {} at {}", runtime.active_network(), runtime.url())
        });
        ctx.try_log(|logger| {
            let classifier = config.classifier();
            debug!(
                logger,
                "Local networks: {}; forked networks: {}",
                classifier.local_networks().collect::<Vec<_>>().join(", "),
                classifier.forked_networks().collect::<Vec<_>>().join(", ")
            )
        });
        Ok(Fixtures::new(runtime, config, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(100, 100, 1 => false ; "mined but no later block")]
    #[test_case(101, 100, 1 => true ; "one later block")]
    #[test_case(101, 100, 2 => false ; "one of two blocks")]
    #[test_case(150, 100, 2 => true ; "well past depth")]
    #[test_case(100, 100, 0 => true ; "inclusion only")]
    #[test_case(99, 100, 0 => false ; "head behind receipt")]
    #[test_case(u64::MAX, u64::MAX, 1 => false ; "no overflow at the top")]
    fn confirmation_depth(head: u64, block: u64, confirmations: u64) -> bool {
        is_confirmed(head, block, confirmations)
    }

    #[test]
    fn test_from_config_uses_default_network() {
        let config = FixtureConfig::from_toml_str("").unwrap();
        let runtime = EvmRuntime::from_config(&config, None).unwrap();
        assert_eq!(runtime.active_network(), "development");
        assert_eq!(runtime.url().as_str(), "http://127.0.0.1:8545/");
    }

    #[test]
    fn test_from_config_forked_network_uses_local_node() {
        let config = FixtureConfig::from_toml_str("").unwrap();
        let runtime = EvmRuntime::from_config(&config, Some("mainnet-fork")).unwrap();
        assert_eq!(runtime.active_network(), "mainnet-fork");
        assert_eq!(runtime.url().as_str(), "http://127.0.0.1:8545/");
    }

    #[test]
    fn test_from_config_requires_rpc_url_for_live_networks() {
        let config = FixtureConfig::from_toml_str("").unwrap();
        let error = EvmRuntime::from_config(&config, Some("rinkeby")).err().unwrap();
        assert_eq!(error.current_context(), &FixtureError::Config);
    }

    #[test]
    fn test_local_accounts_follow_mnemonic() {
        let runtime =
            EvmRuntime::new("development", "http://127.0.0.1:8545", ArtifactStore::new("out"))
                .unwrap();
        let first = runtime.local_account(0).unwrap();
        assert_eq!(first.source, AccountSource::Local(0));
        assert_eq!(
            first.address,
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse::<Address>().unwrap()
        );

        let from_key = runtime
            .account_from_key("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")
            .unwrap();
        assert_eq!(from_key.address, first.address);
        assert_eq!(from_key.source, AccountSource::PrivateKey);
    }

    #[test]
    fn test_load_account_requires_password() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("deployer.json"), "{}").unwrap();
        let runtime =
            EvmRuntime::new("development", "http://127.0.0.1:8545", ArtifactStore::new("out"))
                .unwrap()
                .with_keystore(Some(dir.path().to_path_buf()), None);
        let error = runtime.load_account("deployer").unwrap_err();
        assert!(matches!(error.current_context(), ChainError::Keystore(_)));
    }

    #[test]
    fn test_transfer_calldata() {
        let to = Address::repeat_byte(0x22);
        let data = IERC20::transferCall { to, value: U256::from(500u64) }.abi_encode();
        // transfer(address,uint256)
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(data.len(), 4 + 64);
    }
}
