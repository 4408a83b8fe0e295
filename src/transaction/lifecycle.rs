//! Broadcast and confirmation of a signed transaction

use crate::constants::{NOT_INDEXED_GRACE, POLL_INTERVAL, TX_TIMEOUT};
use crate::error::RpcError;
use crate::rpc::{RoninRpc, TxReceipt};
use crate::signer::SignedTransaction;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Receipt polling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Give up once this much time has passed since the broadcast
    pub timeout: Duration,
    /// Sleep after a not-found answer
    pub poll_interval: Duration,
    /// Sleep after the node reports the receipt as not indexed yet
    pub not_indexed_grace: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: TX_TIMEOUT,
            poll_interval: POLL_INTERVAL,
            not_indexed_grace: NOT_INDEXED_GRACE,
        }
    }
}

/// Why a transaction failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// Mined with a failed status
    Reverted(TxReceipt),
    /// The node refused the broadcast
    Rejected(RpcError),
}

/// State of a broadcast transaction
///
/// `Pending` and `NotFound` are the in-flight states of the poll loop; the
/// remaining variants are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// Broadcast, no receipt requested yet
    Pending,
    Success(TxReceipt),
    Failed(FailureCause),
    /// No receipt before the timeout elapsed
    TimedOut,
    /// Last poll found no receipt
    NotFound,
    /// The node answered with an error that says nothing about the
    /// transaction; needs manual reconciliation
    Unknown(RpcError),
}

impl TransactionOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionOutcome::Pending | TransactionOutcome::NotFound)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TransactionOutcome::Success(_))
    }

    /// Failed or timed out, the outcomes remediation acts on
    pub fn is_stuck_or_failed(&self) -> bool {
        matches!(
            self,
            TransactionOutcome::Failed(_) | TransactionOutcome::TimedOut
        )
    }
}

/// Drives one signed transaction from broadcast to a terminal outcome
///
/// The controller never retries or remediates; that is left to the caller.
/// Every state it passes through is published to its subscribers.
pub struct LifecycleController<R> {
    rpc: Arc<R>,
    poll: PollConfig,
    state: watch::Sender<TransactionOutcome>,
}

impl<R: RoninRpc> LifecycleController<R> {
    pub fn new(rpc: Arc<R>, poll: PollConfig) -> Self {
        let (state, _) = watch::channel(TransactionOutcome::Pending);
        Self { rpc, poll, state }
    }

    /// Follow the state of the transaction being driven
    pub fn subscribe(&self) -> watch::Receiver<TransactionOutcome> {
        self.state.subscribe()
    }

    /// Latest published state
    pub fn state(&self) -> TransactionOutcome {
        self.state.borrow().clone()
    }

    fn finish(&self, outcome: TransactionOutcome) -> TransactionOutcome {
        self.state.send_replace(outcome.clone());
        outcome
    }

    /// Broadcast `signed` and poll for its receipt until a terminal outcome
    ///
    /// The timeout is measured from the broadcast and checked once per poll,
    /// so a slow node can overrun it by one interval.
    pub async fn submit_and_await(
        &self,
        signed: &SignedTransaction,
        timeout: Duration,
    ) -> TransactionOutcome {
        let hash = signed.hash();
        let started = Instant::now();

        match self.rpc.send_raw_transaction(signed.raw().clone()).await {
            Ok(reported) => {
                if reported != hash {
                    tracing::warn!("Node reported hash {} for transaction {}", reported, hash);
                }
            }
            Err(RpcError::AlreadyKnown) => {
                tracing::debug!("Transaction {} already known to the node", hash);
            }
            Err(err) => {
                tracing::error!("Broadcast of transaction {} rejected: {}", hash, err);
                return self.finish(TransactionOutcome::Failed(FailureCause::Rejected(err)));
            }
        }
        self.state.send_replace(TransactionOutcome::Pending);

        let mut polls = 0u32;
        loop {
            polls += 1;
            let wait = match self.rpc.get_transaction_receipt(hash).await {
                Ok(Some(receipt)) if receipt.status => {
                    return self.finish(TransactionOutcome::Success(receipt))
                }
                Ok(Some(receipt)) => {
                    tracing::warn!("Transaction {} reverted in block {:?}", hash, receipt.block_number);
                    return self.finish(TransactionOutcome::Failed(FailureCause::Reverted(receipt)));
                }
                Ok(None) => self.poll.poll_interval,
                Err(RpcError::NotYetIndexed(message)) => {
                    tracing::debug!("Receipt of {} not indexed yet: {}", hash, message);
                    self.poll.not_indexed_grace
                }
                Err(err) => {
                    tracing::error!(
                        "Unexpected error while polling {}, outcome unknown: {}",
                        hash,
                        err
                    );
                    return self.finish(TransactionOutcome::Unknown(err));
                }
            };
            self.state.send_replace(TransactionOutcome::NotFound);

            if started.elapsed() >= timeout {
                tracing::warn!("Transaction {} timed out after {} polls", hash, polls);
                return self.finish(TransactionOutcome::TimedOut);
            }

            tracing::debug!("Waiting for transaction {} (poll {})", hash, polls);
            tokio::time::sleep(wait).await;
        }
    }
}
