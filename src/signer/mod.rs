//! Transaction signer abstraction for the Ronin SDK
//!
//! This module provides a trait-based abstraction for signing transactions and
//! messages, allowing every operation to run with either a local private key or
//! a hardware signing device (Trezor-style) holding the key.

mod hardware;
mod local;

pub use hardware::{DerivationPath, DeviceSignature, HardwareSigner, SigningDevice};
pub use local::LocalSigner;

use crate::error::SigningError;
use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use std::future::Future;

/// Unsigned legacy transaction, fully specified
///
/// The nonce is assigned right before signing; each attempt builds a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub chain_id: u64,
    /// Target contract address
    pub to: Address,
    /// Encoded calldata
    pub data: Bytes,
    /// Native token amount in wei
    pub value: U256,
    pub gas_limit: u64,
    /// Gas price in wei
    pub gas_price: u128,
    pub nonce: u64,
}

/// Signed raw transaction ready for broadcast
///
/// Immutable once produced; the hash is derived from the encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    raw: Bytes,
    hash: TxHash,
    nonce: u64,
}

impl SignedTransaction {
    /// Wrap encoded bytes, computing their keccak hash
    pub fn from_raw(raw: impl Into<Bytes>, nonce: u64) -> Self {
        let raw = raw.into();
        let hash = keccak256(&raw);
        Self { raw, hash, nonce }
    }

    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Nonce the transaction was signed with
    pub fn nonce(&self) -> u64 {
        self.nonce
    }
}

/// Trait for signing Ronin transactions and messages
///
/// This abstraction allows the SDK to work with different signing mechanisms:
/// - `LocalSigner`: Uses an in-memory private key
/// - `HardwareSigner`: Delegates to a hardware device identified by a derivation path
pub trait TransactionSigner: Send + Sync {
    /// Returns the signer's address
    fn address(&self) -> Address;

    /// Signs a transaction, returning the encoded raw bytes and their hash
    fn sign_transaction(
        &self,
        tx: &UnsignedTransaction,
    ) -> impl Future<Output = Result<SignedTransaction, SigningError>> + Send;

    /// Signs a text message (EIP-191 personal message), returning the 65-byte signature
    fn sign_message(
        &self,
        message: &str,
    ) -> impl Future<Output = Result<Bytes, SigningError>> + Send;
}
