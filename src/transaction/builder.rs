//! Unsigned transaction assembly for each supported contract call

use crate::config::NetworkConfig;
use crate::constants::{
    APPROVE_GAS_LIMIT, BREED_GAS_LIMIT, CLAIM_GAS_LIMIT, PAYMENT_GAS_LIMIT, SCATTER_GAS_LIMIT,
    TRANSFER_GAS_LIMIT,
};
use crate::contracts::{IAxie, IERC20, IScatter, ISlp};
use crate::signer::UnsignedTransaction;
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use eyre::{eyre, Result};

/// What an operation wants done, independent of nonce and gas
///
/// Intents are plain values: a retry rebuilds the transaction from the same
/// intent with a freshly fetched nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Breed {
        sire_id: U256,
        matron_id: U256,
    },
    TransferAxie {
        from: Address,
        to: Address,
        axie_id: U256,
    },
    /// Redeem a signed SLP claim voucher
    Checkpoint {
        owner: Address,
        amount: U256,
        created_at: U256,
        signature: Bytes,
    },
    TokenTransfer {
        token: Address,
        to: Address,
        amount: U256,
    },
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    DisperseToken {
        token: Address,
        recipients: Vec<Address>,
        amounts: Vec<U256>,
    },
    /// Native RON disperse; the transaction value is the sum of `amounts`
    DisperseEther {
        recipients: Vec<Address>,
        amounts: Vec<U256>,
    },
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Breed { .. } => "breed",
            Intent::TransferAxie { .. } => "axie transfer",
            Intent::Checkpoint { .. } => "claim",
            Intent::TokenTransfer { .. } => "token transfer",
            Intent::Approve { .. } => "approve",
            Intent::DisperseToken { .. } => "token scatter",
            Intent::DisperseEther { .. } => "ron scatter",
        }
    }

    /// Gas limit used when the caller does not override it
    pub fn default_gas_limit(&self) -> u64 {
        match self {
            Intent::Breed { .. } => BREED_GAS_LIMIT,
            Intent::TransferAxie { .. } => TRANSFER_GAS_LIMIT,
            Intent::Checkpoint { .. } => CLAIM_GAS_LIMIT,
            Intent::TokenTransfer { .. } => PAYMENT_GAS_LIMIT,
            Intent::Approve { .. } => APPROVE_GAS_LIMIT,
            Intent::DisperseToken { .. } | Intent::DisperseEther { .. } => SCATTER_GAS_LIMIT,
        }
    }
}

/// Gas limit and price for one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSettings {
    pub gas_limit: u64,
    /// Gas price in wei
    pub gas_price: u128,
}

impl GasSettings {
    pub fn new(gas_limit: u64, gas_price: u128) -> Self {
        Self {
            gas_limit,
            gas_price,
        }
    }

    /// Default gas limit of `intent` at `gas_price`
    pub fn for_intent(intent: &Intent, gas_price: u128) -> Self {
        Self::new(intent.default_gas_limit(), gas_price)
    }
}

/// Sum of `amounts`, `None` on overflow
pub fn checked_total(amounts: &[U256]) -> Option<U256> {
    amounts
        .iter()
        .try_fold(U256::ZERO, |acc, amount| acc.checked_add(*amount))
}

/// Builds unsigned transactions against the configured contracts
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    chain_id: u64,
    axie: Address,
    slp: Address,
    scatter: Address,
}

impl TransactionBuilder {
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            chain_id: config.chain_id,
            axie: config.axie,
            slp: config.slp,
            scatter: config.scatter,
        }
    }

    /// Assemble the transaction for `intent` at `nonce`
    pub fn build(
        &self,
        intent: &Intent,
        gas: GasSettings,
        nonce: u64,
    ) -> Result<UnsignedTransaction> {
        let (to, data, value) = self.encode(intent)?;

        Ok(UnsignedTransaction {
            chain_id: self.chain_id,
            to,
            data,
            value,
            gas_limit: gas.gas_limit,
            gas_price: gas.gas_price,
            nonce,
        })
    }

    fn encode(&self, intent: &Intent) -> Result<(Address, Bytes, U256)> {
        let encoded = match intent {
            Intent::Breed { sire_id, matron_id } => {
                let call = IAxie::breedAxiesCall {
                    _sireId: *sire_id,
                    _matronId: *matron_id,
                };
                (self.axie, Bytes::from(call.abi_encode()), U256::ZERO)
            }
            Intent::TransferAxie { from, to, axie_id } => {
                let call = IAxie::safeTransferFromCall {
                    _from: *from,
                    _to: *to,
                    _tokenId: *axie_id,
                };
                (self.axie, Bytes::from(call.abi_encode()), U256::ZERO)
            }
            Intent::Checkpoint {
                owner,
                amount,
                created_at,
                signature,
            } => {
                let call = ISlp::checkpointCall {
                    _owner: *owner,
                    _amount: *amount,
                    _createdAt: *created_at,
                    _signature: signature.clone(),
                };
                (self.slp, Bytes::from(call.abi_encode()), U256::ZERO)
            }
            Intent::TokenTransfer { token, to, amount } => {
                let call = IERC20::transferCall {
                    _to: *to,
                    _value: *amount,
                };
                (*token, Bytes::from(call.abi_encode()), U256::ZERO)
            }
            Intent::Approve {
                token,
                spender,
                amount,
            } => {
                let call = IERC20::approveCall {
                    _spender: *spender,
                    _value: *amount,
                };
                (*token, Bytes::from(call.abi_encode()), U256::ZERO)
            }
            Intent::DisperseToken {
                token,
                recipients,
                amounts,
            } => {
                let call = IScatter::disperseTokenSimpleCall {
                    token: *token,
                    recipients: recipients.clone(),
                    values: amounts.clone(),
                };
                (self.scatter, Bytes::from(call.abi_encode()), U256::ZERO)
            }
            Intent::DisperseEther {
                recipients,
                amounts,
            } => {
                let call = IScatter::disperseEtherCall {
                    recipients: recipients.clone(),
                    values: amounts.clone(),
                };
                let total = checked_total(amounts)
                    .ok_or_else(|| eyre!("Scatter amounts overflow the transaction value"))?;
                (self.scatter, Bytes::from(call.abi_encode()), total)
            }
        };
        Ok(encoded)
    }
}
