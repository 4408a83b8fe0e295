//! Ronin RPC endpoint access
//!
//! [`RoninRpc`] is the request/response surface the transaction lifecycle
//! needs from a node. [`RoninProvider`] implements it on top of an alloy HTTP
//! provider and translates provider errors into [`RpcError`] kinds.

use crate::error::RpcError;
use alloy::network::{Ethereum, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use alloy::transports::http::reqwest::Url;
use eyre::{Context, Result};
use std::future::Future;
use std::time::Duration;

/// Receipt fields the SDK acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: TxHash,
    /// `true` when the transaction executed successfully
    pub status: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Interval between receipt polls in [`RoninRpc::wait_for_transaction_receipt`]
const RECEIPT_WAIT_INTERVAL: Duration = Duration::from_secs(2);

/// Node operations consumed by the SDK
pub trait RoninRpc: Send + Sync {
    /// Transaction count of an address, i.e. its next nonce
    fn get_transaction_count(
        &self,
        address: Address,
    ) -> impl Future<Output = Result<u64, RpcError>> + Send;

    /// Broadcast a signed raw transaction
    fn send_raw_transaction(
        &self,
        raw: Bytes,
    ) -> impl Future<Output = Result<TxHash, RpcError>> + Send;

    /// Receipt of a mined transaction, `None` when not found
    fn get_transaction_receipt(
        &self,
        hash: TxHash,
    ) -> impl Future<Output = Result<Option<TxReceipt>, RpcError>> + Send;

    /// Native token balance
    fn get_balance(&self, address: Address) -> impl Future<Output = Result<U256, RpcError>> + Send;

    /// Execute a view call against a contract
    fn call(&self, to: Address, data: Bytes) -> impl Future<Output = Result<Bytes, RpcError>> + Send;

    /// Poll until a receipt shows up or `timeout` elapses
    ///
    /// Not-found and not-yet-indexed answers keep the wait going; any other
    /// error ends it.
    fn wait_for_transaction_receipt(
        &self,
        hash: TxHash,
        timeout: Duration,
    ) -> impl Future<Output = Result<TxReceipt, RpcError>> + Send
    where
        Self: Sized,
    {
        async move {
            let started = tokio::time::Instant::now();
            loop {
                match self.get_transaction_receipt(hash).await {
                    Ok(Some(receipt)) => return Ok(receipt),
                    Ok(None) | Err(RpcError::NotYetIndexed(_)) => {}
                    Err(err) => return Err(err),
                }

                if started.elapsed() >= timeout {
                    return Err(RpcError::Timeout(hash));
                }
                tokio::time::sleep(RECEIPT_WAIT_INTERVAL).await;
            }
        }
    }
}

/// Execute a typed view call and decode its return value
pub async fn call_contract<R, C>(rpc: &R, to: Address, call: &C) -> Result<C::Return, RpcError>
where
    R: RoninRpc,
    C: SolCall + Sync,
{
    let output = rpc.call(to, Bytes::from(call.abi_encode())).await?;
    Ok(C::abi_decode_returns(&output)?)
}

/// HTTP JSON-RPC client for a Ronin node
#[derive(Clone)]
pub struct RoninProvider {
    provider: RootProvider<Ethereum>,
}

impl RoninProvider {
    /// Connect to an RPC url
    pub fn connect(rpc_url: impl AsRef<str>) -> Result<Self> {
        let url: Url = rpc_url.as_ref().parse().context("Invalid RPC URL")?;
        // Read-only provider without fillers: nonce, gas and signing are explicit
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .network::<Ethereum>()
            .connect_http(url);

        Ok(Self { provider })
    }
}

impl RoninRpc for RoninProvider {
    async fn get_transaction_count(&self, address: Address) -> Result<u64, RpcError> {
        Ok(self.provider.get_transaction_count(address).await?)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, RpcError> {
        let pending = self.provider.send_raw_transaction(&raw).await?;
        Ok(*pending.tx_hash())
    }

    async fn get_transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, RpcError> {
        let receipt = self.provider.get_transaction_receipt(hash).await?;

        Ok(receipt.map(|receipt| TxReceipt {
            transaction_hash: receipt.transaction_hash(),
            status: receipt.status(),
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
        }))
    }

    async fn get_balance(&self, address: Address) -> Result<U256, RpcError> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError> {
        let request = TransactionRequest::default().with_to(to).with_input(data);
        Ok(self.provider.call(request).await?)
    }
}
