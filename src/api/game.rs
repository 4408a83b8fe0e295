//! Game REST API: SLP claim eligibility and claim vouchers

use super::http::ApiClient;
use crate::address::RoninAddress;
use crate::constants::CLAIM_COOLDOWN_DAYS;
use crate::error::ApiError;
use alloy::primitives::{Address, Bytes, U256};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer};

/// SLP reward state of an account as reported by the game server
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClaimableSlp {
    /// SLP owned in game plus in wallet
    #[serde(deserialize_with = "de_u256")]
    pub total: U256,
    /// Unix seconds of the last claim
    #[serde(rename = "last_claimed_item_at", deserialize_with = "de_timestamp")]
    pub last_claimed_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "de_u256")]
    pub claimable_total: U256,
}

impl ClaimableSlp {
    /// First moment a new claim is allowed
    pub fn next_claim_at(&self) -> DateTime<Utc> {
        self.last_claimed_at + Duration::days(CLAIM_COOLDOWN_DAYS)
    }

    /// Whether the last claim is too recent to claim again at `now`
    pub fn in_cooldown(&self, now: DateTime<Utc>) -> bool {
        self.next_claim_at() > now
    }

    /// SLP left to claim given the wallet balance, `None` when nothing can be
    /// claimed at `now`
    ///
    /// `force` ignores the claim cooldown.
    pub fn unclaimed(&self, wallet_balance: U256, now: DateTime<Utc>, force: bool) -> Option<U256> {
        if !force && self.in_cooldown(now) {
            return None;
        }

        let unclaimed = self.total.saturating_sub(wallet_balance);
        (!unclaimed.is_zero()).then_some(unclaimed)
    }
}

/// Server-signed voucher redeemed on chain with `checkpoint`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimVoucher {
    pub amount: U256,
    /// Unix seconds the voucher was issued
    pub timestamp: U256,
    pub signature: Bytes,
}

#[derive(Deserialize)]
struct ClaimResponse {
    blockchain_related: Option<BlockchainRelated>,
}

#[derive(Deserialize)]
struct BlockchainRelated {
    signature: Option<RawVoucher>,
}

#[derive(Deserialize)]
struct RawVoucher {
    #[serde(deserialize_with = "de_u256")]
    amount: U256,
    #[serde(deserialize_with = "de_u256")]
    timestamp: U256,
    #[serde(default)]
    signature: String,
}

/// Client for the game REST API
#[derive(Debug, Clone)]
pub struct GameApi {
    http: ApiClient,
    base_url: String,
}

impl GameApi {
    pub fn new(http: ApiClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn items_url(&self, account: Address) -> String {
        format!(
            "{}/clients/{}/items/1",
            self.base_url,
            RoninAddress::from(account).to_hex()
        )
    }

    /// Reward state of `account`
    pub async fn claimable_slp(&self, account: Address) -> Result<ClaimableSlp, ApiError> {
        self.http.get_json(&self.items_url(account), None).await
    }

    /// Request a claim voucher, authenticated with `jwt`
    ///
    /// `Ok(None)` when the server answered without a usable signature.
    pub async fn claim_voucher(
        &self,
        account: Address,
        jwt: &str,
    ) -> Result<Option<ClaimVoucher>, ApiError> {
        let url = format!("{}/claim", self.items_url(account));
        let response: ClaimResponse = self.http.post_json(&url, "", Some(jwt)).await?;

        let Some(raw) = response.blockchain_related.and_then(|b| b.signature) else {
            return Ok(None);
        };
        if raw.signature.trim_start_matches("0x").is_empty() {
            return Ok(None);
        }

        let signature = raw
            .signature
            .parse::<Bytes>()
            .map_err(|_| ApiError::MissingField("blockchain_related.signature.signature"))?;

        Ok(Some(ClaimVoucher {
            amount: raw.amount,
            timestamp: raw.timestamp,
            signature,
        }))
    }
}

/// Integer given as a JSON number or a decimal string
fn de_u256<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => match n.as_u64() {
            Some(v) => Ok(U256::from(v)),
            None => n
                .as_f64()
                .filter(|v| *v >= 0.0)
                .map(|v| U256::from(v as u128))
                .ok_or_else(|| D::Error::custom(format!("invalid amount {}", n))),
        },
        serde_json::Value::String(s) => s
            .parse::<U256>()
            .map_err(|e| D::Error::custom(format!("invalid amount {:?}: {}", s, e))),
        serde_json::Value::Null => Ok(U256::ZERO),
        other => Err(D::Error::custom(format!("invalid amount {}", other))),
    }
}

/// Unix seconds, integer or fractional
fn de_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    use serde::de::Error;

    let seconds = f64::deserialize(deserializer)?;
    DateTime::from_timestamp(seconds.trunc() as i64, 0)
        .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {}", seconds)))
}
