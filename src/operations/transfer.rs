//! Axie transfer between accounts

use super::Operation;
use crate::address::RoninAddress;
use crate::client::{Endpoint, RoninClient};
use crate::constants::gwei;
use crate::rpc::RoninRpc;
use crate::signer::TransactionSigner;
use crate::transaction::Intent;
use alloy::primitives::{Address, TxHash, U256};
use std::fmt;

pub struct Transfer<'a, S: TransactionSigner, R: RoninRpc> {
    client: &'a RoninClient<S, R>,
    to: Address,
    axie_id: U256,
}

impl<'a, S: TransactionSigner, R: RoninRpc> Transfer<'a, S, R> {
    pub fn new(client: &'a RoninClient<S, R>, to: Address, axie_id: U256) -> Self {
        Self {
            client,
            to,
            axie_id,
        }
    }
}

impl<S: TransactionSigner, R: RoninRpc> fmt::Display for Transfer<'_, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Axie Transfer of axie ({}) from account ({}) to account ({})",
            self.axie_id,
            RoninAddress::from(self.client.address()),
            RoninAddress::from(self.to)
        )
    }
}

impl<S: TransactionSigner, R: RoninRpc> Operation for Transfer<'_, S, R> {
    type Output = TxHash;

    async fn execute(&self) -> Option<TxHash> {
        let from = self.client.address();
        if from == self.to {
            tracing::warn!("{}: sender and recipient are the same account", self);
            return None;
        }

        let intent = Intent::TransferAxie {
            from,
            to: self.to,
            axie_id: self.axie_id,
        };
        let hash = self
            .client
            .runner(Endpoint::Standard)
            .with_gas_price(gwei(1))
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
    use crate::contracts::IAxie;
    use crate::operations::test_support::{hardware_client, local_client};
    use crate::testing::{FakeRpc, ReceiptStep, RECIPIENT};
    use alloy::consensus::Transaction;
    use alloy::sol_types::SolCall;
    use std::sync::Arc;

    #[test]
    fn test_display() {
        let rpc = Arc::new(FakeRpc::new(0));
        let client = local_client(&rpc, "http://127.0.0.1:9");
        let transfer = client.transfer(RECIPIENT, U256::from(42));

        assert_eq!(
            transfer.to_string(),
            format!(
                "Axie Transfer of axie (42) from account ({}) to account (ronin:1111111111111111111111111111111111111111)",
                RoninAddress::from(client.address()).to_ronin()
            )
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transfer_pays_one_gwei() {
        let rpc = Arc::new(FakeRpc::new(0));
        rpc.push_receipts([ReceiptStep::Mined(true)]);
        let client = local_client(&rpc, "http://127.0.0.1:9");

        assert!(client.transfer(RECIPIENT, U256::from(42)).execute().await.is_some());

        let sent = rpc.sent();
        assert_eq!(sent[0].gas_price(), Some(gwei(1)));
        let call = IAxie::safeTransferFromCall::abi_decode(sent[0].input()).unwrap();
        assert_eq!(call._from, client.address());
        assert_eq!(call._to, RECIPIENT);
        assert_eq!(call._tokenId, U256::from(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transfer_with_hardware_signer() {
        let rpc = Arc::new(FakeRpc::new(9));
        rpc.push_receipts([ReceiptStep::Mined(true)]);
        let client = hardware_client(&rpc).await;

        let hash = client.transfer(RECIPIENT, U256::from(42)).execute().await;

        let sent = rpc.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(hash, Some(*sent[0].tx_hash()));
        assert_eq!(sent[0].nonce(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverted_transfer_is_not_remediated() {
        let rpc = Arc::new(FakeRpc::new(0));
        rpc.push_receipts([ReceiptStep::Mined(false)]);
        let client = local_client(&rpc, "http://127.0.0.1:9");

        assert_eq!(client.transfer(RECIPIENT, U256::from(42)).execute().await, None);
        assert_eq!(rpc.sent().len(), 1);
    }
}
