//! Axie GraphQL gateway: sign-to-authenticate, axie details and morphing

use super::http::ApiClient;
use crate::address::RoninAddress;
use crate::constants::MORPH_DELAY_DAYS;
use crate::error::ApiError;
use crate::signer::TransactionSigner;
use alloy::primitives::{Address, U256};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const CREATE_RANDOM_MESSAGE: &str = "mutation CreateRandomMessage{createRandomMessage}";

const CREATE_ACCESS_TOKEN: &str = "mutation CreateAccessTokenWithSignature($input: SignatureInput!)\
{createAccessTokenWithSignature(input: $input) {newAccount result accessToken __typename}}";

const AXIE_BIRTH: &str = "query GetAxieDetail($axieId: ID!) { axie(axieId: $axieId) \
{ ...AxieDetail __typename}} fragment AxieDetail on Axie { id birthDate bodyShape __typename }";

const AXIE_PARTS: &str = "query GetAxieDetail($axieId: ID!) { axie(axieId: $axieId) \
{ ...AxieDetail }} fragment AxieDetail on Axie { id class parts { ...AxiePart }} \
fragment AxiePart on AxiePart { id name class type }";

const MORPH_AXIE: &str = "mutation MorphAxie($axieId: ID!, $owner: String!, $signature: String!) \
{morphAxie(axieId: $axieId, owner: $owner, signature: $signature)}";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a> {
    operation_name: &'a str,
    variables: serde_json::Value,
    query: &'a str,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize, Debug)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RandomMessageData {
    create_random_message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessTokenData {
    create_access_token_with_signature: Option<AccessToken>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessToken {
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct AxieData<T> {
    axie: Option<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MorphData {
    morph_axie: Option<bool>,
}

/// Birth date and adult body shape of an axie
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxieDetail {
    pub id: String,
    /// Unix seconds
    pub birth_date: i64,
    /// `None` until the axie has been morphed
    pub body_shape: Option<String>,
}

impl AxieDetail {
    /// First moment the axie can be morphed
    pub fn morph_date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.birth_date, 0).map(|birth| birth + Duration::days(MORPH_DELAY_DAYS))
    }

    pub fn is_adult(&self) -> bool {
        self.body_shape.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct AxiePart {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AxieParts {
    class: Option<String>,
    #[serde(default)]
    parts: Vec<AxiePart>,
}

/// Client for the GraphQL gateway
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: ApiClient,
    url: String,
}

impl GraphQlClient {
    pub fn new(http: ApiClient, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        operation_name: &str,
        query: &str,
        variables: serde_json::Value,
        bearer: Option<&str>,
    ) -> Result<Option<T>, ApiError> {
        let request = GraphQlRequest {
            operation_name,
            variables,
            query,
        };
        let response: GraphQlResponse<T> = self.http.post_json(&self.url, &request, bearer).await?;

        if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
            let messages = errors.into_iter().map(|e| e.message).collect();
            return Err(ApiError::GraphQl(messages));
        }

        Ok(response.data)
    }

    /// Server issued challenge for the sign-to-authenticate handshake
    pub async fn create_random_message(&self) -> Result<String, ApiError> {
        let data: Option<RandomMessageData> = self
            .execute("CreateRandomMessage", CREATE_RANDOM_MESSAGE, serde_json::json!({}), None)
            .await?;

        data.and_then(|d| d.create_random_message)
            .filter(|message| !message.is_empty())
            .ok_or(ApiError::MissingField("data.createRandomMessage"))
    }

    /// Obtain a bearer JWT by signing a fresh challenge with `signer`
    ///
    /// A missing token usually means the key does not belong to the account.
    pub async fn access_token<S: TransactionSigner>(&self, signer: &S) -> Result<String, ApiError> {
        let message = self.create_random_message().await?;
        let signature = signer.sign_message(&message).await?;
        let owner = RoninAddress::from(signer.address()).to_hex();

        let variables = serde_json::json!({
            "input": {
                "mainnet": "ronin",
                "owner": owner,
                "message": message,
                "signature": signature.to_string(),
            }
        });
        let data: Option<AccessTokenData> = self
            .execute("CreateAccessTokenWithSignature", CREATE_ACCESS_TOKEN, variables, None)
            .await?;

        data.and_then(|d| d.create_access_token_with_signature)
            .and_then(|t| t.access_token)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::MissingField(
                "data.createAccessTokenWithSignature.accessToken",
            ))
    }

    /// Birth date and body shape of an axie
    pub async fn axie_detail(&self, axie_id: U256) -> Result<AxieDetail, ApiError> {
        let data: Option<AxieData<AxieDetail>> = self
            .execute(
                "GetAxieDetail",
                AXIE_BIRTH,
                serde_json::json!({ "axieId": axie_id.to_string() }),
                None,
            )
            .await?;

        data.and_then(|d| d.axie).ok_or(ApiError::MissingField("data.axie"))
    }

    /// Lowercased body parts by part type, plus `class`
    pub async fn axie_parts(&self, axie_id: U256) -> Result<BTreeMap<String, String>, ApiError> {
        let data: Option<AxieData<AxieParts>> = self
            .execute(
                "GetAxieDetail",
                AXIE_PARTS,
                serde_json::json!({ "axieId": axie_id.to_string() }),
                None,
            )
            .await?;
        let axie = data.and_then(|d| d.axie).ok_or(ApiError::MissingField("data.axie"))?;

        let mut parts: BTreeMap<String, String> = axie
            .parts
            .into_iter()
            .map(|part| (part.kind.to_lowercase(), part.name.to_lowercase()))
            .collect();
        if let Some(class) = axie.class {
            parts.insert("class".to_string(), class.to_lowercase());
        }
        Ok(parts)
    }

    /// Submit the morph mutation; `true` when the gateway accepted it
    pub async fn morph_axie(
        &self,
        jwt: &str,
        axie_id: U256,
        owner: Address,
        signature: &str,
    ) -> Result<bool, ApiError> {
        let variables = serde_json::json!({
            "axieId": axie_id.to_string(),
            "owner": RoninAddress::from(owner).to_hex(),
            "signature": signature,
        });
        let data: Option<MorphData> = self
            .execute("MorphAxie", MORPH_AXIE, variables, Some(jwt))
            .await?;

        Ok(data.and_then(|d| d.morph_axie).unwrap_or(false))
    }
}

/// Message an owner signs to authorize morphing `axie_id`
pub fn morph_message(axie_id: U256, owner: Address) -> String {
    format!("axie_id={}&owner={}", axie_id, RoninAddress::from(owner).to_hex())
}
