//! Breed two owned axies through the free-gas endpoint

use super::Operation;
use crate::address::RoninAddress;
use crate::client::{Endpoint, RoninClient};
use crate::rpc::RoninRpc;
use crate::signer::TransactionSigner;
use crate::transaction::Intent;
use alloy::primitives::{TxHash, U256};
use std::fmt;

pub struct Breed<'a, S: TransactionSigner, R: RoninRpc> {
    client: &'a RoninClient<S, R>,
    sire_id: U256,
    matron_id: U256,
}

impl<'a, S: TransactionSigner, R: RoninRpc> Breed<'a, S, R> {
    pub fn new(client: &'a RoninClient<S, R>, sire_id: U256, matron_id: U256) -> Self {
        Self {
            client,
            sire_id,
            matron_id,
        }
    }
}

impl<S: TransactionSigner, R: RoninRpc> fmt::Display for Breed<'_, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Breeding axie {} with {} in account {}",
            self.sire_id,
            self.matron_id,
            RoninAddress::from(self.client.address())
        )
    }
}

impl<S: TransactionSigner, R: RoninRpc> Operation for Breed<'_, S, R> {
    type Output = TxHash;

    async fn execute(&self) -> Option<TxHash> {
        if self.sire_id == self.matron_id {
            tracing::warn!("{}: an axie cannot breed with itself", self);
            return None;
        }

        let intent = Intent::Breed {
            sire_id: self.sire_id,
            matron_id: self.matron_id,
        };
        let hash = self
            .client
            .runner(Endpoint::FreeGas)
            .with_gas_price(0)
            .run(&intent)
            .await;

        match hash {
            Some(_) => tracing::info!("{} completed successfully", self),
            None => tracing::error!("{} failed", self),
        }
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BREED_GAS_LIMIT;
    use crate::contracts::IAxie;
    use crate::operations::test_support::local_client;
    use crate::testing::{FakeRpc, ReceiptStep};
    use alloy::consensus::Transaction;
    use alloy::sol_types::SolCall;
    use std::sync::Arc;

    #[test]
    fn test_display() {
        let rpc = Arc::new(FakeRpc::new(0));
        let client = local_client(&rpc, "http://127.0.0.1:9");
        let breed = client.breed(U256::from(123), U256::from(456));

        let expected = format!(
            "Breeding axie 123 with 456 in account {}",
            RoninAddress::from(client.address()).to_ronin()
        );
        assert_eq!(breed.to_string(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_breed_sends_free_gas_transaction() {
        let rpc = Arc::new(FakeRpc::new(3));
        rpc.push_receipts([ReceiptStep::Mined(true)]);
        let client = local_client(&rpc, "http://127.0.0.1:9");

        let hash = client.breed(U256::from(123), U256::from(456)).execute().await;

        assert!(hash.is_some());
        let sent = rpc.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].nonce(), 3);
        assert_eq!(sent[0].gas_price(), Some(0));
        assert_eq!(sent[0].gas_limit(), BREED_GAS_LIMIT);
        let call = IAxie::breedAxiesCall::abi_decode(sent[0].input()).unwrap();
        assert_eq!(call._sireId, U256::from(123));
        assert_eq!(call._matronId, U256::from(456));
    }

    #[tokio::test(start_paused = true)]
    async fn test_breed_timeout_returns_none() {
        let rpc = Arc::new(FakeRpc::new(0));
        let client = local_client(&rpc, "http://127.0.0.1:9");

        let hash = client.breed(U256::from(1), U256::from(2)).execute().await;

        assert_eq!(hash, None);
        assert_eq!(rpc.sent().len(), 1);
        assert!(rpc.receipt_polls() >= 30);
    }

    #[tokio::test]
    async fn test_breed_with_itself_is_refused() {
        let rpc = Arc::new(FakeRpc::new(0));
        let client = local_client(&rpc, "http://127.0.0.1:9");

        assert_eq!(client.breed(U256::from(1), U256::from(1)).execute().await, None);
        assert!(rpc.events().is_empty());
    }
}
