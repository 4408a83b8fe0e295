//! RoninClient - main entry point for the SDK

use crate::api::{ApiClient, GameApi, GraphQlClient};
use crate::axies::Axies;
use crate::config::NetworkConfig;
use crate::constants::{ron_to_wei, Token};
use crate::contracts::IERC20;
use crate::operations::{Breed, Claim, Morph, Payment, Scatter, Transfer};
use crate::rpc::{call_contract, RoninProvider, RoninRpc};
use crate::signer::TransactionSigner;
use crate::transaction::TransactionRunner;
use alloy::primitives::{Address, U256};
use eyre::{Context, Result};
use std::sync::Arc;

/// RPC endpoint a transaction is sent through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Regular node, gas paid in RON
    Standard,
    /// Sponsored proxy accepting gas price 0 for game transactions
    FreeGas,
}

/// Client for one Ronin account
///
/// Owns the signer, both RPC endpoints and the game API clients. Operations
/// borrow the client, so any number of them can be created for the same
/// account.
pub struct RoninClient<S: TransactionSigner, R: RoninRpc = RoninProvider> {
    signer: S,
    config: NetworkConfig,
    rpc: Arc<R>,
    free_gas_rpc: Arc<R>,
    game: GameApi,
    graphql: GraphQlClient,
}

impl<S: TransactionSigner> RoninClient<S> {
    /// Create a client talking to the endpoints in `config`
    pub fn new(signer: S, config: NetworkConfig) -> Result<Self> {
        let rpc = RoninProvider::connect(&config.rpc_url)?;
        let free_gas_rpc = RoninProvider::connect(&config.free_gas_rpc_url)?;
        Self::with_rpc(signer, config, Arc::new(rpc), Arc::new(free_gas_rpc))
    }
}

impl<S: TransactionSigner, R: RoninRpc> RoninClient<S, R> {
    /// Create a client over existing RPC handles
    pub fn with_rpc(
        signer: S,
        config: NetworkConfig,
        rpc: Arc<R>,
        free_gas_rpc: Arc<R>,
    ) -> Result<Self> {
        let http = ApiClient::new().context("Failed to build HTTP client")?;
        let game = GameApi::new(http.clone(), config.game_api_url.clone());
        let graphql = GraphQlClient::new(http, config.graphql_url.clone());

        Ok(Self {
            signer,
            config,
            rpc,
            free_gas_rpc,
            game,
            graphql,
        })
    }

    /// Get the signer's address
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    /// Get the network configuration
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn rpc(&self, endpoint: Endpoint) -> &Arc<R> {
        match endpoint {
            Endpoint::Standard => &self.rpc,
            Endpoint::FreeGas => &self.free_gas_rpc,
        }
    }

    pub fn game(&self) -> &GameApi {
        &self.game
    }

    pub fn graphql(&self) -> &GraphQlClient {
        &self.graphql
    }

    /// Transaction runner for this account on `endpoint`
    pub fn runner(&self, endpoint: Endpoint) -> TransactionRunner<'_, S, R> {
        TransactionRunner::new(
            &self.signer,
            Arc::clone(self.rpc(endpoint)),
            &self.config,
        )
    }

    // ========== Queries ==========

    /// Next nonce of this account
    pub async fn nonce(&self) -> Result<u64> {
        self.rpc
            .get_transaction_count(self.address())
            .await
            .context("Failed to get nonce")
    }

    /// Balance of `owner` in `token`, in the token's smallest unit
    ///
    /// For [`Token::Axies`] this is the number of axies owned.
    pub async fn balance_of(&self, owner: Address, token: Token) -> Result<U256> {
        let Some(contract) = self.config.token_contract(token) else {
            return self
                .rpc
                .get_balance(owner)
                .await
                .context("Failed to get RON balance");
        };

        let call = IERC20::balanceOfCall { _owner: owner };
        call_contract(self.rpc.as_ref(), contract, &call)
            .await
            .with_context(|| format!("Failed to call balanceOf on {}", token))
    }

    /// Balance of this account in `token`
    pub async fn balance(&self, token: Token) -> Result<U256> {
        self.balance_of(self.address(), token).await
    }

    /// Axie inventory of this account
    pub fn axies(&self) -> Axies<'_, R> {
        Axies::new(
            self.rpc.as_ref(),
            &self.graphql,
            self.config.axie,
            self.address(),
        )
    }

    // ========== Operations ==========

    pub fn breed(&self, sire_id: U256, matron_id: U256) -> Breed<'_, S, R> {
        Breed::new(self, sire_id, matron_id)
    }

    pub fn claim(&self) -> Claim<'_, S, R> {
        Claim::new(self)
    }

    pub fn morph(&self, axie_id: U256) -> Morph<'_, S, R> {
        Morph::new(self, axie_id)
    }

    /// SLP payment of `amount` to `to`, labelled `name` in logs
    pub fn payment(&self, name: impl Into<String>, to: Address, amount: U256) -> Payment<'_, S, R> {
        Payment::new(self, name, to, amount)
    }

    pub fn transfer(&self, to: Address, axie_id: U256) -> Transfer<'_, S, R> {
        Transfer::new(self, to, axie_id)
    }

    /// Scatter `token` to many recipients; amounts in the token's smallest unit
    pub fn scatter(
        &self,
        token: Token,
        payouts: impl IntoIterator<Item = (Address, U256)>,
    ) -> Scatter<'_, S, R> {
        Scatter::new(self, token, payouts)
    }

    /// Scatter RON given as decimal strings such as `"0.5"`
    pub fn scatter_ron<A: AsRef<str>>(
        &self,
        payouts: impl IntoIterator<Item = (Address, A)>,
    ) -> Result<Scatter<'_, S, R>> {
        let payouts = payouts
            .into_iter()
            .map(|(to, amount)| Ok((to, ron_to_wei(amount.as_ref())?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Scatter::new(self, Token::Ron, payouts))
    }
}
