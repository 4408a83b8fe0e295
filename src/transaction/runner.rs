//! Runs an intent through nonce, build, sign and lifecycle, with remediation

use super::builder::{GasSettings, Intent, TransactionBuilder};
use super::lifecycle::{LifecycleController, PollConfig, TransactionOutcome};
use super::nonce::NonceProvider;
use super::remediation::{RemediationPlan, RemediationPolicy};
use crate::config::NetworkConfig;
use crate::error::RpcError;
use crate::rpc::{RoninRpc, TxReceipt};
use crate::signer::{SignedTransaction, TransactionSigner};
use alloy::primitives::TxHash;
use eyre::{Context, Result};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;

/// Executes intents for one signer against one RPC endpoint
///
/// Failures end in a log entry and `None`; nothing is raised to the caller so
/// a batch over many accounts keeps going.
pub struct TransactionRunner<'a, S, R> {
    signer: &'a S,
    config: &'a NetworkConfig,
    rpc: Arc<R>,
    nonces: NonceProvider<R>,
    builder: TransactionBuilder,
    poll: PollConfig,
    gas_price: u128,
    remediation: RemediationPolicy,
}

impl<'a, S: TransactionSigner, R: RoninRpc> TransactionRunner<'a, S, R> {
    /// Runner with the config's poll settings, gas price 0 and no remediation
    pub fn new(signer: &'a S, rpc: Arc<R>, config: &'a NetworkConfig) -> Self {
        Self {
            signer,
            config,
            nonces: NonceProvider::new(Arc::clone(&rpc)),
            rpc,
            builder: TransactionBuilder::new(config),
            poll: config.poll,
            gas_price: 0,
            remediation: RemediationPolicy::none(),
        }
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Gas price in wei for the first attempt
    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn with_remediation(mut self, remediation: RemediationPolicy) -> Self {
        self.remediation = remediation;
        self
    }

    /// Build and sign `intent` at `nonce`
    pub async fn sign(
        &self,
        intent: &Intent,
        nonce: u64,
        gas_price: u128,
    ) -> Result<SignedTransaction> {
        let tx = self
            .builder
            .build(intent, GasSettings::for_intent(intent, gas_price), nonce)?;
        Ok(self.signer.sign_transaction(&tx).await?)
    }

    /// Run `intent` until it succeeds or there is nothing left to try
    pub async fn run(&self, intent: &Intent) -> Option<TxHash> {
        self.attempt(intent, None, self.gas_price, 0).await
    }

    /// Sign and broadcast `intent` at a fresh nonce, then wait for its receipt
    /// with [`RoninRpc::wait_for_transaction_receipt`]
    pub async fn send_and_wait(&self, intent: &Intent, timeout: Duration) -> Result<TxReceipt> {
        let nonce = self
            .nonces
            .next_nonce(self.signer.address())
            .await
            .context("Failed to get nonce")?;
        let signed = self
            .sign(intent, nonce, self.gas_price)
            .await
            .with_context(|| format!("Failed to sign {} transaction", intent.name()))?;

        match self.rpc.send_raw_transaction(signed.raw().clone()).await {
            Ok(_) | Err(RpcError::AlreadyKnown) => {}
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to send {} transaction", intent.name()))
            }
        }

        self.rpc
            .wait_for_transaction_receipt(signed.hash(), timeout)
            .await
            .with_context(|| format!("Failed waiting for {} transaction", intent.name()))
    }

    /// One attempt; `nonce` is `None` for a fresh start
    fn attempt<'b>(
        &'b self,
        intent: &'b Intent,
        nonce: Option<u64>,
        gas_price: u128,
        attempt: u32,
    ) -> BoxFuture<'b, Option<TxHash>> {
        Box::pin(async move {
            let account = self.signer.address();
            let nonce = match nonce {
                Some(nonce) => nonce,
                None => match self.nonces.next_nonce(account).await {
                    Ok(nonce) => nonce,
                    Err(err) => {
                        tracing::error!("Failed to get nonce for {}: {}", account, err);
                        return None;
                    }
                },
            };

            let signed = match self.sign(intent, nonce, gas_price).await {
                Ok(signed) => signed,
                Err(err) => {
                    tracing::error!("Failed to sign {} transaction: {:#}", intent.name(), err);
                    return None;
                }
            };

            let lifecycle = LifecycleController::new(Arc::clone(&self.rpc), self.poll);
            let outcome = lifecycle.submit_and_await(&signed, self.poll.timeout).await;

            match outcome {
                TransactionOutcome::Success(_) => {
                    tracing::info!(
                        "{} transaction succeeded: {}",
                        intent.name(),
                        self.config.explorer_link(signed.hash())
                    );
                    Some(signed.hash())
                }
                ref outcome if self.remediation.applies_to(outcome, attempt) => {
                    tracing::warn!(
                        "{} transaction {} at nonce {} did not go through ({:?}), remediating",
                        intent.name(),
                        signed.hash(),
                        nonce,
                        outcome
                    );
                    self.remediate(intent, nonce, gas_price, attempt).await
                }
                TransactionOutcome::Unknown(err) => {
                    tracing::error!(
                        "{} transaction {} has an unknown outcome, check it manually: {}",
                        intent.name(),
                        self.config.explorer_link(signed.hash()),
                        err
                    );
                    None
                }
                TransactionOutcome::TimedOut => {
                    tracing::error!(
                        "{} transaction {} timed out",
                        intent.name(),
                        signed.hash()
                    );
                    None
                }
                other => {
                    tracing::error!(
                        "{} transaction {} failed: {:?}",
                        intent.name(),
                        signed.hash(),
                        other
                    );
                    None
                }
            }
        })
    }

    async fn remediate(
        &self,
        intent: &Intent,
        nonce: u64,
        gas_price: u128,
        attempt: u32,
    ) -> Option<TxHash> {
        let account = self.signer.address();
        let plan = match self.remediation.plan(&self.nonces, account, nonce, gas_price).await {
            Ok(Some(plan)) => plan,
            Ok(None) => return None,
            Err(err) => {
                tracing::error!(
                    "Could not check nonce {} of {} for remediation, manual intervention needed: {}",
                    nonce,
                    account,
                    err
                );
                return None;
            }
        };

        match plan {
            RemediationPlan::Superseded => {
                tracing::info!(
                    "Nonce {} of {} already used by another transaction, nothing to remediate",
                    nonce,
                    account
                );
                None
            }
            RemediationPlan::Resubmit { nonce, gas_price } => {
                tracing::info!(
                    "Resubmitting {} at nonce {} with gas price {} wei",
                    intent.name(),
                    nonce,
                    gas_price
                );
                self.attempt(intent, Some(nonce), gas_price, attempt + 1).await
            }
            RemediationPlan::Cancel {
                intent: cancel,
                nonce,
                gas_price: cancel_gas_price,
            } => {
                let signed = match self.sign(&cancel, nonce, cancel_gas_price).await {
                    Ok(signed) => signed,
                    Err(err) => {
                        tracing::error!(
                            "Failed to sign replacement for nonce {}, manual intervention needed: {:#}",
                            nonce,
                            err
                        );
                        return None;
                    }
                };

                let lifecycle = LifecycleController::new(Arc::clone(&self.rpc), self.poll);
                match lifecycle.submit_and_await(&signed, self.poll.timeout).await {
                    TransactionOutcome::Success(_) => {
                        tracing::info!(
                            "Replacement transaction {} freed nonce {}, retrying {} in {:?}",
                            signed.hash(),
                            nonce,
                            intent.name(),
                            self.remediation.retry_delay()
                        );
                        tokio::time::sleep(self.remediation.retry_delay()).await;
                        self.attempt(intent, None, self.gas_price, attempt + 1).await
                    }
                    outcome => {
                        tracing::error!(
                            "Replacement transaction {} for nonce {} of {} did not succeed ({:?}), manual intervention needed",
                            signed.hash(),
                            nonce,
                            account,
                            outcome
                        );
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{gwei, SLP_CONTRACT};
    use crate::contracts::{IAxie, IERC20};
    use crate::signer::LocalSigner;
    use crate::testing::{FakeRpc, ReceiptStep, RpcEvent, RECIPIENT, TEST_KEY};
    use alloy::consensus::Transaction;
    use alloy::primitives::U256;
    use alloy::sol_types::SolCall;

    fn breed() -> Intent {
        Intent::Breed {
            sire_id: U256::from(1),
            matron_id: U256::from(2),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_needs_no_remediation() {
        let signer = LocalSigner::from_private_key(TEST_KEY).unwrap();
        let config = NetworkConfig::default();
        let rpc = Arc::new(FakeRpc::new(4));
        rpc.push_receipts([ReceiptStep::Mined(true)]);

        let runner = TransactionRunner::new(&signer, rpc.clone(), &config)
            .with_remediation(RemediationPolicy::gas_bump());
        let hash = runner.run(&breed()).await;

        assert!(hash.is_some());
        assert_eq!(
            rpc.events(),
            vec![
                RpcEvent::Nonce,
                RpcEvent::Send(IAxie::breedAxiesCall::SELECTOR),
                RpcEvent::Receipt
            ]
        );
        assert_eq!(rpc.sent()[0].nonce(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gas_bump_resubmits_at_same_nonce() {
        let signer = LocalSigner::from_private_key(TEST_KEY).unwrap();
        let config = NetworkConfig::default();
        let rpc = Arc::new(FakeRpc::new(4));
        rpc.push_receipts([ReceiptStep::Mined(false), ReceiptStep::Mined(true)]);

        let runner = TransactionRunner::new(&signer, rpc.clone(), &config)
            .with_gas_price(gwei(1))
            .with_remediation(RemediationPolicy::gas_bump());
        let hash = runner.run(&breed()).await;

        let sent = rpc.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].nonce(), 4);
        assert_eq!(sent[1].nonce(), 4);
        assert_eq!(sent[0].gas_price(), Some(1_000_000_000));
        assert_eq!(sent[1].gas_price(), Some(1_010_000_000));
        assert_eq!(hash, Some(*sent[1].tx_hash()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gas_bump_is_bounded() {
        let signer = LocalSigner::from_private_key(TEST_KEY).unwrap();
        let config = NetworkConfig::default();
        let rpc = Arc::new(FakeRpc::new(4));
        rpc.push_receipts(vec![ReceiptStep::Mined(false); 10]);

        let runner = TransactionRunner::new(&signer, rpc.clone(), &config)
            .with_gas_price(gwei(1))
            .with_remediation(RemediationPolicy::gas_bump().with_max_attempts(2));

        assert_eq!(runner.run(&breed()).await, None);
        assert_eq!(rpc.sent().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_then_retry_from_scratch() {
        let signer = LocalSigner::from_private_key(TEST_KEY).unwrap();
        let config = NetworkConfig::default();
        let rpc = Arc::new(FakeRpc::new(4));
        // original reverts, replacement lands, retry lands at the next nonce
        rpc.push_nonces([4, 4, 5]);
        rpc.push_receipts([
            ReceiptStep::Mined(false),
            ReceiptStep::Mined(true),
            ReceiptStep::Mined(true),
        ]);
        let intent = Intent::TokenTransfer {
            token: SLP_CONTRACT,
            to: RECIPIENT,
            amount: U256::from(10),
        };

        let runner = TransactionRunner::new(&signer, rpc.clone(), &config)
            .with_remediation(RemediationPolicy::cancel_and_unstick(SLP_CONTRACT));
        let hash = runner.run(&intent).await;

        let sent = rpc.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[1].nonce(), 4);
        let cancel = IERC20::transferCall::abi_decode(sent[1].input()).unwrap();
        assert_eq!(cancel._to, signer.address());
        assert_eq!(cancel._value, U256::ZERO);
        assert_eq!(sent[2].nonce(), 5);
        assert_eq!(hash, Some(*sent[2].tx_hash()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_replacement_stops() {
        let signer = LocalSigner::from_private_key(TEST_KEY).unwrap();
        let config = NetworkConfig::default();
        let rpc = Arc::new(FakeRpc::new(4));
        rpc.push_receipts([ReceiptStep::Mined(false), ReceiptStep::Mined(false)]);

        let runner = TransactionRunner::new(&signer, rpc.clone(), &config)
            .with_remediation(RemediationPolicy::cancel_and_unstick(SLP_CONTRACT));

        assert_eq!(runner.run(&breed()).await, None);
        assert_eq!(rpc.sent().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_outcome_is_not_remediated() {
        let signer = LocalSigner::from_private_key(TEST_KEY).unwrap();
        let config = NetworkConfig::default();
        let rpc = Arc::new(FakeRpc::new(4));
        rpc.push_receipts([ReceiptStep::Error(RpcError::Transport("reset".into()))]);

        let runner = TransactionRunner::new(&signer, rpc.clone(), &config)
            .with_remediation(RemediationPolicy::gas_bump());

        assert_eq!(runner.run(&breed()).await, None);
        assert_eq!(rpc.sent().len(), 1);
        assert_eq!(rpc.events().iter().filter(|e| **e == RpcEvent::Nonce).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_and_wait_returns_receipt() {
        let signer = LocalSigner::from_private_key(TEST_KEY).unwrap();
        let config = NetworkConfig::default();
        let rpc = Arc::new(FakeRpc::new(0));
        rpc.push_receipts([ReceiptStep::Missing, ReceiptStep::Mined(true)]);

        let runner = TransactionRunner::new(&signer, rpc.clone(), &config);
        let receipt = runner
            .send_and_wait(&breed(), Duration::from_secs(240))
            .await
            .unwrap();

        assert!(receipt.status);
        assert_eq!(receipt.transaction_hash, *rpc.sent()[0].tx_hash());
    }
}
