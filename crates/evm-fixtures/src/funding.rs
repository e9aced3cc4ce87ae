use alloy::primitives::{Address, TxHash, U256};
use error_stack::ResultExt;

use crate::accounts::{Account, AccountRequest};
use crate::constants::{DEFAULT_FUNDING_AMOUNT, FUNDING_CONFIRMATIONS};
use crate::contracts::{ContractHandle, MockContract};
use crate::errors::{FixtureError, FixtureErrorExt, FixtureResult};
use crate::runtime::ChainRuntime;
use crate::Fixtures;

/// Overrides for [`Fixtures::fund_with_token`]
#[derive(Debug, Clone)]
pub struct FundingOptions {
    /// Sender; resolved with the default account policy when unset
    pub account: Option<Account>,
    /// Token to send; resolved as `link_token` when unset
    pub token: Option<ContractHandle>,
    /// Amount in token base units, 0.1 token by default
    pub amount: U256,
}

impl Default for FundingOptions {
    fn default() -> Self {
        Self { account: None, token: None, amount: U256::from(DEFAULT_FUNDING_AMOUNT) }
    }
}

impl FundingOptions {
    pub fn with_account(mut self, account: Account) -> Self {
        self.account = Some(account);
        self
    }

    pub fn with_token(mut self, token: ContractHandle) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_amount(mut self, amount: U256) -> Self {
        self.amount = amount;
        self
    }
}

/// A confirmed funding transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub from: Address,
    pub to: Address,
    pub token: Address,
    pub amount: U256,
    pub confirmations: u64,
}

impl<R: ChainRuntime> Fixtures<R> {
    /// Transfer tokens to `target` and wait for one confirmation.
    pub fn fund_with_token(
        &mut self,
        target: Address,
        options: FundingOptions,
    ) -> FixtureResult<FundingReceipt> {
        let FundingOptions { account, token, amount } = options;
        let account = match account {
            Some(account) => account,
            None => self.resolve_account(&AccountRequest::default())?,
        };
        let token = match token {
            Some(token) => token,
            None => self.resolve_mock(MockContract::LinkToken)?,
        };

        let tx_hash = self
            .runtime
            .transfer(&token, target, amount, &account)
            .change_context(FixtureError::Transfer)
            .attach_printable_lazy(|| {
                format!("Transfer of {amount} from {} to {target} rejected", account.address)
            })
            .with_contract_info(token.name(), Some(token.address))?;
        self.ctx.try_log(|logger| {
            debug!(logger, "Transfer {} submitted, waiting for confirmation", tx_hash)
        });

        let confirmed = self
            .runtime
            .wait_for_confirmations(tx_hash, FUNDING_CONFIRMATIONS)
            .change_context(FixtureError::Transfer)
            .attach_printable_lazy(|| format!("Transfer {tx_hash} was not confirmed"))?;

        if !confirmed.success {
            return Err::<FundingReceipt, _>(fixture_error!(
                FixtureError::Transfer,
                "Transfer {tx_hash} reverted in block {}",
                confirmed.block_number
            ))
            .with_contract_info(token.name(), Some(token.address));
        }

        self.ctx.try_log(|logger| {
            info!(logger, "Funded {} with {} {}", target, amount, token.name())
        });
        Ok(FundingReceipt {
            tx_hash,
            block_number: confirmed.block_number,
            from: account.address,
            to: target,
            token: token.address,
            amount,
            confirmations: FUNDING_CONFIRMATIONS,
        })
    }
}
