//! Error types for the Ronin SDK
//!
//! Operations use `eyre` for ergonomic error handling with context. The
//! boundaries (addresses, signing, the RPC node and the game API) return typed
//! errors so callers can tell a recoverable condition from a fatal one.

pub use eyre::{eyre, Context, Report, Result};

use alloy::primitives::TxHash;
use alloy::transports::{RpcError as TransportRpcError, TransportErrorKind};
use thiserror::Error;

/// Errors produced while parsing or normalizing an address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("invalid address {0:?}: expected 40 hex characters after `ronin:` or `0x`")]
    Invalid(String),
}

/// Errors produced by a signing strategy
///
/// Signing failures are never retried automatically.
#[derive(Error, Debug)]
pub enum SigningError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("invalid derivation path {0:?}")]
    InvalidPath(String),

    #[error("local signer error: {0}")]
    Local(#[from] alloy::signers::Error),

    #[error("signing device unavailable or rejected the request: {0}")]
    Device(String),

    #[error("signing device returned a malformed signature: {0}")]
    MalformedSignature(String),
}

/// Semantic error kinds reported by the RPC endpoint
///
/// Provider specific error text is translated into one of these at the client
/// boundary; call sites match on the kind, never on the message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("transaction already known to the node")]
    AlreadyKnown,

    #[error("receipt not indexed yet: {0}")]
    NotYetIndexed(String),

    #[error("nonce too low: {0}")]
    NonceTooLow(String),

    #[error("node rejected the request (code {code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("timed out waiting for the receipt of {0}")]
    Timeout(TxHash),
}

impl RpcError {
    /// Classify a JSON-RPC error response by code and message
    pub fn classify(code: i64, message: &str) -> Self {
        let lowered = message.to_ascii_lowercase();

        if lowered.contains("already known") || lowered.contains("known transaction") {
            RpcError::AlreadyKnown
        } else if lowered.contains("receipts not found by")
            || lowered.contains("receipt not found")
        {
            RpcError::NotYetIndexed(message.to_string())
        } else if lowered.contains("nonce too low") {
            RpcError::NonceTooLow(message.to_string())
        } else {
            RpcError::Rejected {
                code,
                message: message.to_string(),
            }
        }
    }
}

impl From<TransportRpcError<TransportErrorKind>> for RpcError {
    fn from(value: TransportRpcError<TransportErrorKind>) -> Self {
        match value {
            TransportRpcError::ErrorResp(payload) => RpcError::classify(payload.code, &payload.message),
            TransportRpcError::DeserError { err, .. } => RpcError::Decode(err.to_string()),
            other => RpcError::Transport(other.to_string()),
        }
    }
}

impl From<alloy::sol_types::Error> for RpcError {
    fn from(value: alloy::sol_types::Error) -> Self {
        RpcError::Decode(value.to_string())
    }
}

/// Errors produced by the game REST and GraphQL clients
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} failed after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },

    #[error("unexpected status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("response is missing `{0}`")]
    MissingField(&'static str),

    #[error("graphql errors: {0:?}")]
    GraphQl(Vec<String>),

    #[error(transparent)]
    Signing(#[from] SigningError),
}
