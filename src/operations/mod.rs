//! Account operations built on the transaction runner
//!
//! Each operation borrows a [`RoninClient`](crate::RoninClient), checks its
//! preconditions, then drives one or more transactions to completion. Every
//! failure ends in a log entry and `None`, so a batch over many accounts keeps
//! going when one of them fails.

mod breed;
mod claim;
mod morph;
mod payment;
mod scatter;
mod transfer;

pub use breed::Breed;
pub use claim::Claim;
pub use morph::Morph;
pub use payment::Payment;
pub use scatter::Scatter;
pub use transfer::Transfer;

use std::fmt::Display;
use std::future::Future;

/// A unit of work against one account
///
/// `Display` renders the human description used in logs.
pub trait Operation: Display {
    type Output: Send;

    /// Run the operation to completion; `None` when it did not happen
    fn execute(&self) -> impl Future<Output = Option<Self::Output>> + Send;
}
