//! Network configuration for the Ronin SDK

use crate::constants::{
    Token, AXIE_CONTRACT, AXS_CONTRACT, CLAIM_POLL_INTERVAL, EXPLORER_TX_URL, GAME_API_URL, GRAPHQL_URL,
    NOT_INDEXED_GRACE, POLL_INTERVAL, RONIN_CHAIN_ID, RONIN_FREE_GAS_RPC_URL, RONIN_RPC_URL,
    SCATTER_CONTRACT, SLP_CONTRACT, TX_TIMEOUT, USDC_CONTRACT, WETH_CONTRACT,
};
use crate::transaction::PollConfig;
use alloy::primitives::{Address, TxHash};

/// Network configuration containing endpoints and contract addresses (Ronin mainnet)
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Chain ID (2020 for Ronin)
    pub chain_id: u64,
    /// Standard RPC endpoint
    pub rpc_url: String,
    /// Free-gas proxy for sponsored game transactions
    pub free_gas_rpc_url: String,
    /// Game REST API base url
    pub game_api_url: String,
    /// GraphQL gateway url
    pub graphql_url: String,
    /// Explorer base url for transaction links
    pub explorer_tx_url: String,
    /// Axie ERC-721 contract
    pub axie: Address,
    /// SLP token contract
    pub slp: Address,
    /// AXS token contract
    pub axs: Address,
    /// WETH token contract
    pub weth: Address,
    /// USDC token contract
    pub usdc: Address,
    /// Scatter (disperse) contract
    pub scatter: Address,
    /// Receipt polling used by most operations
    pub poll: PollConfig,
    /// Receipt polling used by claims
    pub claim_poll: PollConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkConfig {
    /// Create Ronin mainnet configuration (default)
    pub fn new() -> Self {
        let poll = PollConfig {
            timeout: TX_TIMEOUT,
            poll_interval: POLL_INTERVAL,
            not_indexed_grace: NOT_INDEXED_GRACE,
        };

        Self {
            chain_id: RONIN_CHAIN_ID,
            rpc_url: RONIN_RPC_URL.to_string(),
            free_gas_rpc_url: RONIN_FREE_GAS_RPC_URL.to_string(),
            game_api_url: GAME_API_URL.to_string(),
            graphql_url: GRAPHQL_URL.to_string(),
            explorer_tx_url: EXPLORER_TX_URL.to_string(),
            axie: AXIE_CONTRACT,
            slp: SLP_CONTRACT,
            axs: AXS_CONTRACT,
            weth: WETH_CONTRACT,
            usdc: USDC_CONTRACT,
            scatter: SCATTER_CONTRACT,
            poll,
            claim_poll: PollConfig {
                poll_interval: CLAIM_POLL_INTERVAL,
                ..poll
            },
        }
    }

    /// Mainnet configuration with endpoints overridden from the environment
    ///
    /// Loads `.env` if present, then reads `RONIN_RPC_URL`,
    /// `RONIN_FREE_GAS_RPC_URL`, `AXIE_GAME_API_URL` and `AXIE_GRAPHQL_URL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::new();
        if let Ok(url) = std::env::var("RONIN_RPC_URL") {
            config.rpc_url = url;
        }
        if let Ok(url) = std::env::var("RONIN_FREE_GAS_RPC_URL") {
            config.free_gas_rpc_url = url;
        }
        if let Ok(url) = std::env::var("AXIE_GAME_API_URL") {
            config.game_api_url = url;
        }
        if let Ok(url) = std::env::var("AXIE_GRAPHQL_URL") {
            config.graphql_url = url;
        }
        config
    }

    /// Set the standard RPC url
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    /// Set the free-gas RPC url
    pub fn with_free_gas_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.free_gas_rpc_url = rpc_url.into();
        self
    }

    /// Set the polling parameters used by every operation except claims
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Set the polling parameters used by claims
    pub fn with_claim_poll(mut self, poll: PollConfig) -> Self {
        self.claim_poll = poll;
        self
    }

    /// Contract of `token` on this network, `None` for native RON
    pub fn token_contract(&self, token: Token) -> Option<Address> {
        match token {
            Token::Slp => Some(self.slp),
            Token::Axs => Some(self.axs),
            Token::Axies => Some(self.axie),
            Token::Weth => Some(self.weth),
            Token::Usdc => Some(self.usdc),
            Token::Ron => None,
        }
    }

    /// Explorer link for a transaction
    pub fn explorer_link(&self, hash: TxHash) -> String {
        format!("{}/{}", self.explorer_tx_url, hash)
    }
}
