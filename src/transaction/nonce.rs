use crate::error::RpcError;
use crate::rpc::RoninRpc;
use alloy::primitives::Address;
use std::sync::Arc;

/// Next-nonce lookup
///
/// Every call goes to the node; nothing is cached, so two callers racing on
/// one account see the chain's view rather than a stale local counter.
pub struct NonceProvider<R> {
    rpc: Arc<R>,
}

impl<R> Clone for NonceProvider<R> {
    fn clone(&self) -> Self {
        Self {
            rpc: Arc::clone(&self.rpc),
        }
    }
}

impl<R: RoninRpc> NonceProvider<R> {
    pub fn new(rpc: Arc<R>) -> Self {
        Self { rpc }
    }

    /// Current transaction count of `address`
    pub async fn next_nonce(&self, address: Address) -> Result<u64, RpcError> {
        let nonce = self.rpc.get_transaction_count(address).await?;
        tracing::debug!("Next nonce for {}: {}", address, nonce);
        Ok(nonce)
    }

    /// Whether `nonce` is still the one the chain expects from `address`
    pub async fn is_current(&self, address: Address, nonce: u64) -> Result<bool, RpcError> {
        Ok(self.next_nonce(address).await? == nonce)
    }
}
