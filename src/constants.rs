//! Constants, contract addresses and unit helpers for the Ronin SDK

use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy::primitives::{address, Address, U256};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Ronin mainnet chain id
pub const RONIN_CHAIN_ID: u64 = 2020;

/// Standard Ronin RPC endpoint
pub const RONIN_RPC_URL: &str = "https://api.roninchain.com/rpc";

/// Free-gas proxy used for sponsored game transactions
pub const RONIN_FREE_GAS_RPC_URL: &str = "https://proxy.roninchain.com/free-gas-rpc";

/// Game REST API base
pub const GAME_API_URL: &str = "https://game-api.skymavis.com/game-api";

/// Axie GraphQL gateway
pub const GRAPHQL_URL: &str = "https://graphql-gateway.axieinfinity.com/graphql";

/// Transaction explorer base
pub const EXPLORER_TX_URL: &str = "https://explorer.roninchain.com/tx";

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_9_2) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/36.0.1944.0 Safari/537.36";

pub const AXIE_CONTRACT: Address = address!("32950db2a7164ae833121501c797d79e7b79d74c");
pub const AXS_CONTRACT: Address = address!("97a9107c1793bc407d6f527b77e7fff4d812bece");
pub const SLP_CONTRACT: Address = address!("a8754b9fa15fc18bb59458815510e40a12cd2014");
pub const WETH_CONTRACT: Address = address!("c99a6a985ed2cac1ef41640596c5a5f9f4e19ef5");
pub const USDC_CONTRACT: Address = address!("0b7007c13325c48911f73a2dad5fa5dcbf808adc");
pub const SCATTER_CONTRACT: Address = address!("14978681c5f8ce2f6b66d1f1551b0ec67405574c");

/// Gas limits per operation
pub const BREED_GAS_LIMIT: u64 = 492_874;
pub const CLAIM_GAS_LIMIT: u64 = 492_874;
pub const PAYMENT_GAS_LIMIT: u64 = 246_437;
pub const TRANSFER_GAS_LIMIT: u64 = 492_874;
pub const SCATTER_GAS_LIMIT: u64 = 1_000_000;
pub const APPROVE_GAS_LIMIT: u64 = 1_000_000;

/// One gwei in wei
pub const GWEI: u128 = 1_000_000_000;

/// Default timeout before a pending transaction is considered stuck
pub const TX_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Sleep between receipt polls
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Sleep when the node reports the receipt as not indexed yet
pub const NOT_INDEXED_GRACE: Duration = Duration::from_secs(20);

/// Claims poll faster
pub const CLAIM_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Timeout for the scatter approval receipt
pub const APPROVAL_TIMEOUT: Duration = Duration::from_secs(240);

/// Wait before re-running an operation after its nonce was unstuck
pub const RETRY_DELAY: Duration = Duration::from_secs(10);

/// Days between two SLP claims
pub const CLAIM_COOLDOWN_DAYS: i64 = 14;

/// Days after birth before an axie can be morphed
pub const MORPH_DELAY_DAYS: i64 = 5;

/// RON has 18 decimals
pub const RON_DECIMALS: u8 = 18;

/// Minimum RON left to pay for a scatter (0.00001 RON)
pub fn min_ron_for_fees() -> U256 {
    U256::from(10_000_000_000_000u64)
}

/// Scale a decimal string such as `"1.1"` to U256 with specified decimals
///
/// Exact for up to `decimals` fractional digits. Negative amounts are
/// rejected.
pub fn scale_to_decimals(value: &str, decimals: u8) -> eyre::Result<U256> {
    let parsed = parse_units(value.trim(), decimals)
        .map_err(|e| eyre::eyre!("Invalid amount {:?}: {}", value, e))?;
    match parsed {
        ParseUnits::U256(scaled) => Ok(scaled),
        ParseUnits::I256(_) => eyre::bail!("Negative amount {:?}", value),
    }
}

/// Unscale a U256 value to floating point with specified decimals
pub fn unscale_from_decimals(value: U256, decimals: u8) -> f64 {
    let divisor = 10u64.pow(decimals as u32) as f64;
    let value_u128: u128 = value.try_into().unwrap_or(u128::MAX);
    value_u128 as f64 / divisor
}

/// Convert a RON amount written in decimal to wei
pub fn ron_to_wei(amount: &str) -> eyre::Result<U256> {
    scale_to_decimals(amount, RON_DECIMALS)
}

/// Convert gwei to wei
pub fn gwei(amount: u64) -> u128 {
    amount as u128 * GWEI
}

/// Tokens the SDK knows how to query and move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Slp,
    Axs,
    Axies,
    Weth,
    Usdc,
    /// Native token
    Ron,
}

impl Token {
    /// Contract address, `None` for the native token
    pub fn contract(&self) -> Option<Address> {
        match self {
            Token::Slp => Some(SLP_CONTRACT),
            Token::Axs => Some(AXS_CONTRACT),
            Token::Axies => Some(AXIE_CONTRACT),
            Token::Weth => Some(WETH_CONTRACT),
            Token::Usdc => Some(USDC_CONTRACT),
            Token::Ron => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Token::Slp => "slp",
            Token::Axs => "axs",
            Token::Axies => "axies",
            Token::Weth => "weth",
            Token::Usdc => "usdc",
            Token::Ron => "ron",
        }
    }
}

impl FromStr for Token {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slp" => Ok(Token::Slp),
            "axs" => Ok(Token::Axs),
            "axies" | "axie" => Ok(Token::Axies),
            "weth" => Ok(Token::Weth),
            "usdc" => Ok(Token::Usdc),
            "ron" => Ok(Token::Ron),
            other => eyre::bail!("Unknown token {}", other),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
