//! Transaction pipeline: nonce, build, sign, broadcast, poll, remediate
//!
//! A façade describes what it wants done as an [`Intent`]. The
//! [`TransactionRunner`] turns the intent into a signed transaction at a fresh
//! nonce, hands it to the [`LifecycleController`] and, when the outcome calls
//! for it, applies the operation's [`RemediationPolicy`].

mod builder;
mod lifecycle;
mod nonce;
mod remediation;
mod runner;

pub use builder::{checked_total, GasSettings, Intent, TransactionBuilder};
pub use lifecycle::{FailureCause, LifecycleController, PollConfig, TransactionOutcome};
pub use nonce::NonceProvider;
pub use remediation::{bumped_gas_price, RemediationPlan, RemediationPolicy, RemediationStrategy};
pub use runner::TransactionRunner;
