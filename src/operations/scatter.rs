//! Scatter: one transaction paying many recipients in a token or in RON
//!
//! Token scatters need the scatter contract to be allowed to move the
//! sender's tokens. When the allowance is short, an unlimited approval is sent
//! first and its receipt awaited before the scatter itself is built.

use super::Operation;
use crate::address::RoninAddress;
use crate::client::{Endpoint, RoninClient};
use crate::constants::{gwei, min_ron_for_fees, Token, APPROVAL_TIMEOUT};
use crate::contracts::IERC20;
use crate::rpc::{call_contract, RoninRpc};
use crate::signer::TransactionSigner;
use crate::transaction::{checked_total, Intent, RemediationPolicy, TransactionRunner};
use alloy::primitives::{Address, TxHash, U256};
use std::fmt;

pub struct Scatter<'a, S: TransactionSigner, R: RoninRpc> {
    client: &'a RoninClient<S, R>,
    token: Token,
    recipients: Vec<Address>,
    amounts: Vec<U256>,
}

impl<'a, S: TransactionSigner, R: RoninRpc> Scatter<'a, S, R> {
    /// Amounts are in the token's smallest unit (wei for RON)
    pub fn new(
        client: &'a RoninClient<S, R>,
        token: Token,
        payouts: impl IntoIterator<Item = (Address, U256)>,
    ) -> Self {
        let (recipients, amounts) = payouts.into_iter().unzip();
        Self {
            client,
            token,
            recipients,
            amounts,
        }
    }

    /// Sum of all amounts, `None` when it does not fit in a U256
    pub fn total(&self) -> Option<U256> {
        checked_total(&self.amounts)
    }

    fn runner(&self) -> TransactionRunner<'a, S, R> {
        self.client
            .runner(Endpoint::Standard)
            .with_gas_price(gwei(1))
    }

    /// Make sure the scatter contract may spend `total` of `contract`
    async fn ensure_allowance(&self, contract: Address, total: U256) -> bool {
        let spender = self.client.config().scatter;
        let call = IERC20::allowanceCall {
            _owner: self.client.address(),
            _spender: spender,
        };
        match call_contract(self.client.rpc(Endpoint::Standard).as_ref(), contract, &call).await {
            Ok(allowance) if allowance >= total => return true,
            Ok(allowance) => tracing::info!(
                "Allowance of {} for scatter is {}, approving unlimited spending",
                self.token,
                allowance
            ),
            Err(err) => {
                tracing::error!("Failed to check {} allowance: {}", self.token, err);
                return false;
            }
        }

        let approve = Intent::Approve {
            token: contract,
            spender,
            amount: U256::MAX,
        };
        match self.runner().send_and_wait(&approve, APPROVAL_TIMEOUT).await {
            Ok(receipt) if receipt.status => true,
            Ok(receipt) => {
                tracing::error!("Approval {} reverted", receipt.transaction_hash);
                false
            }
            Err(err) => {
                tracing::error!("Approval of {} failed: {:#}", self.token, err);
                false
            }
        }
    }

    async fn scatter_token(&self, contract: Address, total: U256) -> Option<TxHash> {
        if !self.ensure_allowance(contract, total).await {
            tracing::warn!(
                "Token {} is not approved to use scatter, skipping {}",
                self.token,
                self
            );
            return None;
        }

        let account = self.client.address();
        let balance = match self.client.balance(self.token).await {
            Ok(balance) => balance,
            Err(err) => {
                tracing::error!("Skipping {}: {:#}", self, err);
                return None;
            }
        };
        if balance < total {
            tracing::warn!(
                "Not enough {} in {} for {}: have {}, need {}",
                self.token,
                RoninAddress::from(account),
                self,
                balance,
                total
            );
            return None;
        }

        let ron = match self.client.balance(Token::Ron).await {
            Ok(ron) => ron,
            Err(err) => {
                tracing::error!("Skipping {}: {:#}", self, err);
                return None;
            }
        };
        if ron < min_ron_for_fees() {
            tracing::warn!(
                "Not enough RON in {} to pay the fees of {}",
                RoninAddress::from(account),
                self
            );
            return None;
        }

        let intent = Intent::DisperseToken {
            token: contract,
            recipients: self.recipients.clone(),
            amounts: self.amounts.clone(),
        };
        self.runner()
            .with_remediation(RemediationPolicy::gas_bump())
            .run(&intent)
            .await
    }

    async fn scatter_ron(&self, total: U256) -> Option<TxHash> {
        let account = self.client.address();

        let balance = match self.client.balance(Token::Ron).await {
            Ok(balance) => balance,
            Err(err) => {
                tracing::error!("Skipping {}: {:#}", self, err);
                return None;
            }
        };
        let needed = total.checked_add(min_ron_for_fees());
        if needed.is_none_or(|needed| balance < needed) {
            tracing::warn!(
                "Not enough RON in {} for {} and its fees: have {}, need {}",
                RoninAddress::from(account),
                self,
                balance,
                total
            );
            return None;
        }

        let intent = Intent::DisperseEther {
            recipients: self.recipients.clone(),
            amounts: self.amounts.clone(),
        };
        self.runner()
            .with_remediation(RemediationPolicy::gas_bump())
            .run(&intent)
            .await
    }
}

impl<S: TransactionSigner, R: RoninRpc> fmt::Display for Scatter<'_, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scatter of {} from {}",
            self.token,
            RoninAddress::from(self.client.address())
        )
    }
}

impl<S: TransactionSigner, R: RoninRpc> Operation for Scatter<'_, S, R> {
    type Output = TxHash;

    async fn execute(&self) -> Option<TxHash> {
        let Some(total) = self.total() else {
            tracing::error!("Skipping {}: amounts add up to more than a U256", self);
            return None;
        };
        if self.recipients.is_empty() || total.is_zero() {
            tracing::info!("Skipping {}: nothing to send", self);
            return None;
        }

        let hash = match self.client.config().token_contract(self.token) {
            None => self.scatter_ron(total).await,
            Some(_) if self.token == Token::Axies => {
                tracing::warn!("Skipping {}: axies cannot be scattered", self);
                return None;
            }
            Some(contract) => self.scatter_token(contract, total).await,
        };

        match hash {
            Some(_) => tracing::info!("{} completed successfully", self),
            None => tracing::error!("{} failed", self),
        }
        hash
    }
}
