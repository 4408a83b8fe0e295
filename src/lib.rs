//! Ronin Axie SDK for Rust
//!
//! A Rust SDK for automating Axie Infinity accounts on the Ronin chain.
//!
//! # Features
//!
//! - Claim SLP rewards
//! - Breed, transfer and morph axies
//! - Pay SLP and scatter tokens or RON to many recipients
//! - Sign with a local private key or a hardware signing device
//!
//! Transactions are polled until they land, fail or time out; payments and
//! scatters remediate stuck transactions on their own.
//!
//! # Example
//!
//! ```rust,ignore
//! use alloy::primitives::U256;
//! use ronin_axie::{LocalSigner, NetworkConfig, Operation, RoninAddress, RoninClient};
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let signer = LocalSigner::from_private_key("0x...")?;
//!     let client = RoninClient::new(signer, NetworkConfig::default())?;
//!
//!     let scholar: RoninAddress = "ronin:1111111111111111111111111111111111111111".parse()?;
//!     client
//!         .payment("Scholar", scholar.address(), U256::from(150))
//!         .execute()
//!         .await;
//!
//!     Ok(())
//! }
//! ```

pub mod address;
pub mod api;
pub mod axies;
pub mod client;
pub mod config;
pub mod constants;
pub mod contracts;
pub mod error;
pub mod operations;
pub mod rpc;
pub mod signer;
pub mod transaction;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use address::RoninAddress;
pub use axies::Axies;
pub use client::{Endpoint, RoninClient};
pub use config::NetworkConfig;
pub use constants::Token;
pub use error::{eyre, AddressError, ApiError, Context, Report, Result, RpcError, SigningError};
pub use operations::{Breed, Claim, Morph, Operation, Payment, Scatter, Transfer};
pub use rpc::{RoninProvider, RoninRpc, TxReceipt};
pub use signer::{DerivationPath, HardwareSigner, LocalSigner, SigningDevice, TransactionSigner};
pub use transaction::{PollConfig, RemediationPolicy, TransactionOutcome};
