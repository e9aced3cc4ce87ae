use std::sync::Arc;

use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, TxHash, U256};

use crate::accounts::Account;
use crate::contracts::{ContractHandle, MockArgs, MockContract};
use crate::errors::ChainResult;

/// A mined transaction, as seen once the requested confirmations are reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedTransaction {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub success: bool,
    pub contract_address: Option<Address>,
}

/// The chain-facing surface fixture operations are built on.
///
/// Every call blocks until the node answers. Implementations are driven from
/// a single caller; none of the operations are meant to run concurrently.
pub trait ChainRuntime {
    /// Name of the network this runtime is connected to
    fn active_network(&self) -> &str;

    /// Unlocked development account at `index`
    fn local_account(&self, index: usize) -> ChainResult<Account>;

    /// Account stored in the encrypted keystore under `id`
    fn load_account(&self, id: &str) -> ChainResult<Account>;

    fn account_from_key(&self, private_key: &str) -> ChainResult<Account>;

    /// Known ABI of a mock contract type
    fn abi(&self, contract: MockContract) -> ChainResult<Arc<JsonAbi>>;

    /// Deploy one mock and wait for its receipt
    fn deploy(&self, args: &MockArgs, sender: &Account) -> ChainResult<ContractHandle>;

    /// Bind an existing deployment to the mock's ABI and name
    fn contract_at(&self, contract: MockContract, address: Address) -> ChainResult<ContractHandle> {
        Ok(ContractHandle::proxy(contract, address, self.abi(contract)?))
    }

    /// Submit an ERC-20 `transfer`; returns as soon as the node accepted it
    fn transfer(
        &self,
        token: &ContractHandle,
        to: Address,
        amount: U256,
        sender: &Account,
    ) -> ChainResult<TxHash>;

    fn wait_for_confirmations(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> ChainResult<ConfirmedTransaction>;
}
