//! SLP reward claim: eligibility, JWT, voucher, on-chain checkpoint

use super::Operation;
use crate::address::RoninAddress;
use crate::client::{Endpoint, RoninClient};
use crate::constants::Token;
use crate::rpc::RoninRpc;
use crate::signer::TransactionSigner;
use crate::transaction::Intent;
use alloy::primitives::{TxHash, U256};
use chrono::Utc;
use std::fmt;

pub struct Claim<'a, S: TransactionSigner, R: RoninRpc> {
    client: &'a RoninClient<S, R>,
    force: bool,
}

impl<'a, S: TransactionSigner, R: RoninRpc> Claim<'a, S, R> {
    pub fn new(client: &'a RoninClient<S, R>) -> Self {
        Self {
            client,
            force: false,
        }
    }

    /// Claim even if the last claim is within the cooldown
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// SLP waiting to be claimed, `None` when there is nothing to claim now
    async fn unclaimed_slp(&self) -> Option<U256> {
        let account = self.client.address();
        let state = match self.client.game().claimable_slp(account).await {
            Ok(state) => state,
            Err(err) => {
                tracing::error!("Failed to get claimable SLP of {}: {}", self, err);
                return None;
            }
        };

        if !self.force && state.in_cooldown(Utc::now()) {
            tracing::info!(
                "Account {} cannot claim until {}",
                RoninAddress::from(account),
                state.next_claim_at()
            );
            return None;
        }

        let balance = match self.client.balance(Token::Slp).await {
            Ok(balance) => balance,
            Err(err) => {
                tracing::error!("Failed to get SLP balance of {}: {:#}", self, err);
                return None;
            }
        };

        state.unclaimed(balance, Utc::now(), self.force)
    }
}

impl<S: TransactionSigner, R: RoninRpc> fmt::Display for Claim<'_, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SLP claim for account ({})", RoninAddress::from(self.client.address()))
    }
}

impl<S: TransactionSigner, R: RoninRpc> Operation for Claim<'_, S, R> {
    type Output = TxHash;

    async fn execute(&self) -> Option<TxHash> {
        let account = self.client.address();

        let Some(unclaimed) = self.unclaimed_slp().await else {
            tracing::info!("Account {} has no claimable SLP", RoninAddress::from(account));
            return None;
        };
        tracing::info!(
            "Account {} has {} unclaimed SLP",
            RoninAddress::from(account),
            unclaimed
        );

        let jwt = match self.client.graphql().access_token(self.client.signer()).await {
            Ok(jwt) => jwt,
            Err(err) => {
                tracing::error!("Skipping {}, could not get JWT: {}", self, err);
                return None;
            }
        };

        let voucher = match self.client.game().claim_voucher(account, &jwt).await {
            Ok(Some(voucher)) => voucher,
            Ok(None) => {
                tracing::error!("Skipping {}, the game API returned no claim signature", self);
                return None;
            }
            Err(err) => {
                tracing::error!("Skipping {}, claim request failed: {}", self, err);
                return None;
            }
        };

        let intent = Intent::Checkpoint {
            owner: account,
            amount: voucher.amount,
            created_at: voucher.timestamp,
            signature: voucher.signature,
        };
        let hash = self
            .client
            .runner(Endpoint::FreeGas)
            .with_gas_price(0)
            .with_poll(self.client.config().claim_poll)
            .run(&intent)
            .await;

        let Some(hash) = hash else {
            tracing::error!("{} failed", self);
            return None;
        };

        match self.client.balance(Token::Slp).await {
            Ok(balance) => tracing::info!(
                "SLP claimed! New balance for account {} is {}",
                RoninAddress::from(account),
                balance
            ),
            Err(err) => tracing::warn!("SLP claimed, but the new balance is unavailable: {:#}", err),
        }
        Some(hash)
    }
}
