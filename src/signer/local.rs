//! Local private key signer implementation

use super::{SignedTransaction, TransactionSigner, UnsignedTransaction};
use crate::error::SigningError;
use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxKind};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

/// Local signer using a private key
///
/// The key stays in memory for the lifetime of the signer. Signing is
/// deterministic (RFC 6979) for a given transaction and key.
#[derive(Clone)]
pub struct LocalSigner {
    signer: PrivateKeySigner,
}

impl LocalSigner {
    /// Create a new LocalSigner from a private key hex string
    ///
    /// # Arguments
    ///
    /// * `private_key` - Hex-encoded private key (with or without 0x prefix, any case)
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let signer = LocalSigner::from_private_key("0x...")?;
    /// ```
    pub fn from_private_key(private_key: impl AsRef<str>) -> Result<Self, SigningError> {
        let key = private_key.as_ref().trim().to_ascii_lowercase();
        let key = key.strip_prefix("0x").unwrap_or(&key);

        let signer: PrivateKeySigner = key
            .parse()
            .map_err(|e: alloy::signers::local::LocalSignerError| {
                SigningError::InvalidKey(e.to_string())
            })?;

        Ok(Self { signer })
    }

    /// Wrap an existing alloy signer
    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    fn sign_sync(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, SigningError> {
        let mut legacy = TxLegacy {
            chain_id: Some(tx.chain_id),
            nonce: tx.nonce,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            to: TxKind::Call(tx.to),
            value: tx.value,
            input: tx.data.clone(),
        };

        let signature = self.signer.sign_transaction_sync(&mut legacy)?;
        let envelope = TxEnvelope::Legacy(legacy.into_signed(signature));

        Ok(SignedTransaction::from_raw(envelope.encoded_2718(), tx.nonce))
    }
}

impl TransactionSigner for LocalSigner {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_transaction(
        &self,
        tx: &UnsignedTransaction,
    ) -> Result<SignedTransaction, SigningError> {
        self.sign_sync(tx)
    }

    async fn sign_message(&self, message: &str) -> Result<Bytes, SigningError> {
        let signature = self.signer.sign_message_sync(message.as_bytes())?;
        Ok(Bytes::from(signature.as_bytes().to_vec()))
    }
}
