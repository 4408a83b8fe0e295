//! SLP payment to a named recipient through the free-gas endpoint

use super::Operation;
use crate::address::RoninAddress;
use crate::client::{Endpoint, RoninClient};
use crate::rpc::RoninRpc;
use crate::signer::TransactionSigner;
use crate::transaction::{Intent, RemediationPolicy};
use alloy::primitives::{Address, TxHash, U256};
use std::fmt;

/// SLP payment; a failed payment unsticks its nonce with a zero SLP transfer
/// to self and is retried once
pub struct Payment<'a, S: TransactionSigner, R: RoninRpc> {
    client: &'a RoninClient<S, R>,
    name: String,
    to: Address,
    amount: U256,
}

impl<'a, S: TransactionSigner, R: RoninRpc> Payment<'a, S, R> {
    pub fn new(
        client: &'a RoninClient<S, R>,
        name: impl Into<String>,
        to: Address,
        amount: U256,
    ) -> Self {
        Self {
            client,
            name: name.into(),
            to,
            amount,
        }
    }
}

impl<S: TransactionSigner, R: RoninRpc> fmt::Display for Payment<'_, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) for the amount of {} SLP",
            self.name,
            RoninAddress::from(self.to),
            self.amount
        )
    }
}

impl<S: TransactionSigner, R: RoninRpc> Operation for Payment<'_, S, R> {
    type Output = TxHash;

    async fn execute(&self) -> Option<TxHash> {
        if self.amount.is_zero() {
            tracing::info!("Skipping payment {}: nothing to pay", self);
            return None;
        }

        let slp = self.client.config().slp;
        let intent = Intent::TokenTransfer {
            token: slp,
            to: self.to,
            amount: self.amount,
        };
        let hash = self
            .client
            .runner(Endpoint::FreeGas)
            .with_gas_price(0)
            .with_remediation(RemediationPolicy::cancel_and_unstick(slp))
            .run(&intent)
            .await;

        match hash {
            Some(_) => tracing::info!("Payment {} completed successfully", self),
            None => tracing::error!("Payment {} failed", self),
        }
        hash
    }
}
