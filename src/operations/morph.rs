//! Morph an adult axie through the GraphQL gateway

use super::Operation;
use crate::address::RoninAddress;
use crate::api::morph_message;
use crate::client::RoninClient;
use crate::rpc::RoninRpc;
use crate::signer::TransactionSigner;
use alloy::primitives::U256;
use std::fmt;

pub struct Morph<'a, S: TransactionSigner, R: RoninRpc> {
    client: &'a RoninClient<S, R>,
    axie_id: U256,
}

impl<'a, S: TransactionSigner, R: RoninRpc> Morph<'a, S, R> {
    pub fn new(client: &'a RoninClient<S, R>, axie_id: U256) -> Self {
        Self { client, axie_id }
    }
}

impl<S: TransactionSigner, R: RoninRpc> fmt::Display for Morph<'_, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Morph of axie ({}) in account ({})",
            self.axie_id,
            RoninAddress::from(self.client.address())
        )
    }
}

impl<S: TransactionSigner, R: RoninRpc> Operation for Morph<'_, S, R> {
    type Output = ();

    async fn execute(&self) -> Option<()> {
        let owner = self.client.address();

        let jwt = match self.client.graphql().access_token(self.client.signer()).await {
            Ok(jwt) => jwt,
            Err(err) => {
                tracing::error!("Skipping {}, could not get JWT: {}", self, err);
                return None;
            }
        };

        let message = morph_message(self.axie_id, owner);
        let signature = match self.client.signer().sign_message(&message).await {
            Ok(signature) => signature,
            Err(err) => {
                tracing::error!("Skipping {}, could not sign morph message: {}", self, err);
                return None;
            }
        };

        match self
            .client
            .graphql()
            .morph_axie(&jwt, self.axie_id, owner, &signature.to_string())
            .await
        {
            Ok(true) => {
                tracing::info!("{} completed successfully", self);
                Some(())
            }
            Ok(false) => {
                tracing::warn!("{} was not accepted, the axie may not be ready yet", self);
                None
            }
            Err(err) => {
                tracing::error!("{} failed: {}", self, err);
                None
            }
        }
    }
}
