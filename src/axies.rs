//! Axie inventory queries: ownership, listing and morph readiness

use crate::api::GraphQlClient;
use crate::contracts::IAxie;
use crate::rpc::{call_contract, RoninRpc};
use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use std::collections::BTreeMap;

/// Read-only view of the axies owned by one account
pub struct Axies<'a, R> {
    rpc: &'a R,
    graphql: &'a GraphQlClient,
    contract: Address,
    account: Address,
}

impl<'a, R: RoninRpc> Axies<'a, R> {
    pub fn new(rpc: &'a R, graphql: &'a GraphQlClient, contract: Address, account: Address) -> Self {
        Self {
            rpc,
            graphql,
            contract,
            account,
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    /// Number of axies held by the account
    pub async fn number_of_axies(&self) -> Result<u64> {
        let call = IAxie::balanceOfCall {
            _owner: self.account,
        };
        let count = call_contract(self.rpc, self.contract, &call)
            .await
            .context("Failed to get number of axies")?;

        Ok(count.saturating_to())
    }

    /// Whether the account owns `axie_id`
    pub async fn check_axie_owner(&self, axie_id: U256) -> Result<bool> {
        let call = IAxie::ownerOfCall { _tokenId: axie_id };
        let owner = call_contract(self.rpc, self.contract, &call)
            .await
            .with_context(|| format!("Failed to get owner of axie {}", axie_id))?;

        Ok(owner == self.account)
    }

    /// Ids of every axie held by the account
    pub async fn get_axies(&self) -> Result<Vec<U256>> {
        let count = self.number_of_axies().await?;
        let mut axies = Vec::new();

        for index in 0..count {
            let call = IAxie::tokenOfOwnerByIndexCall {
                _owner: self.account,
                _index: U256::from(index),
            };
            let axie_id = call_contract(self.rpc, self.contract, &call)
                .await
                .with_context(|| format!("Failed to get axie at index {}", index))?;
            axies.push(axie_id);
        }

        Ok(axies)
    }

    /// Axies that are old enough to morph at `now` and still unmorphed
    pub async fn find_axies_to_morph(&self, now: DateTime<Utc>) -> Result<Vec<U256>> {
        let mut ready = Vec::new();

        for axie_id in self.get_axies().await? {
            let detail = self
                .graphql
                .axie_detail(axie_id)
                .await
                .with_context(|| format!("Failed to get details of axie {}", axie_id))?;

            if detail.is_adult() {
                continue;
            }
            match detail.morph_date() {
                Some(date) if date <= now => ready.push(axie_id),
                Some(date) => tracing::info!(
                    "Axie {} of {} cannot be morphed until {}",
                    axie_id,
                    self.account,
                    date
                ),
                None => tracing::warn!("Axie {} has an invalid birth date", axie_id),
            }
        }

        Ok(ready)
    }

    /// Body parts of `axie_id`, keyed by part type
    pub async fn axie_parts(&self, axie_id: U256) -> Result<BTreeMap<String, String>> {
        self.graphql
            .axie_parts(axie_id)
            .await
            .with_context(|| format!("Failed to get parts of axie {}", axie_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, RetryPolicy};
    use crate::constants::AXIE_CONTRACT;
    use crate::testing::{FakeRpc, MockServer, RpcEvent, RECIPIENT};
    use alloy::primitives::address;
    use alloy::sol_types::SolCall;
    use chrono::Duration;
    use serde_json::json;

    const OWNER: Address = address!("2222222222222222222222222222222222222222");

    fn graphql(url: &str) -> GraphQlClient {
        let http = ApiClient::new().unwrap().with_retry(RetryPolicy {
            max_retries: 0,
            backoff_factor: std::time::Duration::from_millis(1),
        });
        GraphQlClient::new(http, url)
    }

    fn detail(id: u64, birth: DateTime<Utc>, body_shape: Option<&str>) -> (u16, String) {
        let body = json!({"data": {"axie": {
            "id": id.to_string(),
            "birthDate": birth.timestamp(),
            "bodyShape": body_shape,
        }}});
        (200, body.to_string())
    }

    #[tokio::test]
    async fn test_number_of_axies() {
        let rpc = FakeRpc::new(0);
        rpc.respond(IAxie::balanceOfCall::SELECTOR, U256::from(3));
        let graphql = graphql("http://127.0.0.1:9");
        let axies = Axies::new(&rpc, &graphql, AXIE_CONTRACT, OWNER);

        assert_eq!(axies.number_of_axies().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_check_axie_owner() {
        let rpc = FakeRpc::new(0);
        rpc.respond(IAxie::ownerOfCall::SELECTOR, OWNER);
        let graphql = graphql("http://127.0.0.1:9");

        let mine = Axies::new(&rpc, &graphql, AXIE_CONTRACT, OWNER);
        assert!(mine.check_axie_owner(U256::from(1)).await.unwrap());

        let theirs = Axies::new(&rpc, &graphql, AXIE_CONTRACT, RECIPIENT);
        assert!(!theirs.check_axie_owner(U256::from(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_axies_walks_every_index() {
        let rpc = FakeRpc::new(0);
        rpc.respond(IAxie::balanceOfCall::SELECTOR, U256::from(2));
        rpc.respond(IAxie::tokenOfOwnerByIndexCall::SELECTOR, U256::from(77));
        let graphql = graphql("http://127.0.0.1:9");
        let axies = Axies::new(&rpc, &graphql, AXIE_CONTRACT, OWNER);

        let ids = axies.get_axies().await.unwrap();

        assert_eq!(ids, vec![U256::from(77), U256::from(77)]);
        let index_calls = rpc
            .events()
            .into_iter()
            .filter(|e| *e == RpcEvent::Call(IAxie::tokenOfOwnerByIndexCall::SELECTOR))
            .count();
        assert_eq!(index_calls, 2);
    }

    #[tokio::test]
    async fn test_huge_reported_count_does_not_preallocate() {
        let rpc = FakeRpc::new(0);
        rpc.respond(IAxie::balanceOfCall::SELECTOR, U256::MAX);
        let graphql = graphql("http://127.0.0.1:9");
        let axies = Axies::new(&rpc, &graphql, AXIE_CONTRACT, OWNER);

        let err = axies.get_axies().await.unwrap_err();

        assert!(err.to_string().contains("index 0"));
    }

    #[tokio::test]
    async fn test_find_axies_to_morph() {
        let now = Utc::now();
        let rpc = FakeRpc::new(0);
        rpc.respond(IAxie::balanceOfCall::SELECTOR, U256::from(1));
        rpc.respond(IAxie::tokenOfOwnerByIndexCall::SELECTOR, U256::from(5));
        let server = MockServer::start(vec![detail(5, now - Duration::days(6), None)]).await;
        let graphql = graphql(server.url());
        let axies = Axies::new(&rpc, &graphql, AXIE_CONTRACT, OWNER);

        let ready = axies.find_axies_to_morph(now).await.unwrap();

        assert_eq!(ready, vec![U256::from(5)]);
        assert_eq!(server.requests()[0].json()["variables"]["axieId"], "5");
    }

    #[tokio::test]
    async fn test_young_and_adult_axies_are_skipped() {
        let now = Utc::now();
        let rpc = FakeRpc::new(0);
        rpc.respond(IAxie::balanceOfCall::SELECTOR, U256::from(2));
        rpc.respond(IAxie::tokenOfOwnerByIndexCall::SELECTOR, U256::from(5));
        let server = MockServer::start(vec![
            detail(5, now - Duration::days(2), None),
            detail(5, now - Duration::days(30), Some("Normal")),
        ])
        .await;
        let graphql = graphql(server.url());
        let axies = Axies::new(&rpc, &graphql, AXIE_CONTRACT, OWNER);

        assert!(axies.find_axies_to_morph(now).await.unwrap().is_empty());
    }
}
