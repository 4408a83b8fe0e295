//! What to do about a failed or stuck transaction

use super::builder::Intent;
use super::lifecycle::TransactionOutcome;
use super::nonce::NonceProvider;
use crate::constants::RETRY_DELAY;
use crate::error::RpcError;
use crate::rpc::RoninRpc;
use alloy::primitives::{Address, U256};
use std::time::Duration;

/// Remediation strategies an operation can opt into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemediationStrategy {
    /// Replace the stuck transaction with a zero transfer of `token` to
    /// self at the same nonce, then run the operation again from scratch
    CancelAndUnstick { token: Address },
    /// Resubmit the same intent at the same nonce with a higher gas price
    GasBump,
}

/// Action decided after the nonce check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemediationPlan {
    /// The chain moved past the nonce; another transaction took it
    Superseded,
    Cancel {
        intent: Intent,
        nonce: u64,
        gas_price: u128,
    },
    Resubmit {
        nonce: u64,
        gas_price: u128,
    },
}

/// Per-operation remediation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemediationPolicy {
    strategy: Option<RemediationStrategy>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Default for RemediationPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RemediationPolicy {
    /// Log and stop on failure
    pub fn none() -> Self {
        Self {
            strategy: None,
            max_attempts: 0,
            retry_delay: RETRY_DELAY,
        }
    }

    pub fn cancel_and_unstick(token: Address) -> Self {
        Self {
            strategy: Some(RemediationStrategy::CancelAndUnstick { token }),
            max_attempts: 1,
            retry_delay: RETRY_DELAY,
        }
    }

    pub fn gas_bump() -> Self {
        Self {
            strategy: Some(RemediationStrategy::GasBump),
            max_attempts: 3,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Bound on consecutive remediations for one operation
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Whether `outcome` of remediation attempt `attempt` (0 = original)
    /// should be remediated
    pub fn applies_to(&self, outcome: &TransactionOutcome, attempt: u32) -> bool {
        self.strategy.is_some() && outcome.is_stuck_or_failed() && attempt < self.max_attempts
    }

    /// Decide what to do about the transaction of `account` stuck at `nonce`
    ///
    /// Performs exactly one node request, the nonce lookup. When the nonce
    /// has moved on nothing else is done.
    pub async fn plan<R: RoninRpc>(
        &self,
        nonces: &NonceProvider<R>,
        account: Address,
        nonce: u64,
        gas_price: u128,
    ) -> Result<Option<RemediationPlan>, RpcError> {
        let Some(strategy) = self.strategy else {
            return Ok(None);
        };

        if !nonces.is_current(account, nonce).await? {
            return Ok(Some(RemediationPlan::Superseded));
        }

        let plan = match strategy {
            RemediationStrategy::CancelAndUnstick { token } => RemediationPlan::Cancel {
                intent: Intent::TokenTransfer {
                    token,
                    to: account,
                    amount: U256::ZERO,
                },
                nonce,
                gas_price: bumped_gas_price(gas_price),
            },
            RemediationStrategy::GasBump => RemediationPlan::Resubmit {
                nonce,
                gas_price: bumped_gas_price(gas_price),
            },
        };
        Ok(Some(plan))
    }
}

/// Gas price raised by 1%, rounded up; zero stays zero
pub fn bumped_gas_price(gas_price: u128) -> u128 {
    gas_price.saturating_add(gas_price.div_ceil(100))
}
