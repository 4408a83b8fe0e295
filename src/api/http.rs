//! HTTP client with retry for the game REST and GraphQL endpoints

use crate::constants::USER_AGENT;
use crate::error::ApiError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_retry::RetryIf;

/// Retry schedule for idempotent-enough game API calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Sleep before retry `n` is `backoff_factor * 2^(n - 1)`
    pub backoff_factor: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_factor: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Sleep before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        self.backoff_factor
            .saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)))
    }

    /// Server errors worth another attempt
    pub fn is_retryable_status(status: StatusCode) -> bool {
        matches!(
            status,
            StatusCode::INTERNAL_SERVER_ERROR
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT
        )
    }

    /// Server errors, connection failures and timeouts
    fn is_retryable(err: &ApiError) -> bool {
        match err {
            ApiError::Status { status, .. } => Self::is_retryable_status(*status),
            ApiError::Http(err) => err.is_connect() || err.is_timeout(),
            _ => false,
        }
    }
}

/// JSON over HTTPS with retries on server errors and connection failures
///
/// Retries follow [`RetryPolicy::backoff`] and are driven by `tokio-retry`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new() -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .use_rustls_tls()
            .build()?;

        Ok(Self {
            client,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// GET `url` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        bearer: Option<&str>,
    ) -> Result<T, ApiError> {
        let response = self
            .send(url, |client| authorize(client.get(url), bearer))
            .await?;
        Ok(response.json().await?)
    }

    /// POST `body` as JSON to `url` and decode the JSON answer
    pub async fn post_json<B, T>(
        &self,
        url: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(url, |client| authorize(client.post(url).json(body), bearer))
            .await?;
        Ok(response.json().await?)
    }

    async fn send<F>(&self, url: &str, request: F) -> Result<Response, ApiError>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let policy = self.retry;
        let schedule = (1..=policy.max_retries).map(move |retry| policy.backoff(retry));
        let attempts = AtomicU32::new(0);

        let result = RetryIf::spawn(
            schedule,
            || async {
                let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
                let outcome: Result<Response, ApiError> = match request(&self.client).send().await {
                    Ok(response) if response.status().is_success() => return Ok(response),
                    Ok(response) => Err(ApiError::Status {
                        url: url.to_string(),
                        status: response.status(),
                    }),
                    Err(err) => Err(ApiError::Http(err)),
                };
                if let Err(err) = &outcome {
                    if RetryPolicy::is_retryable(err) {
                        tracing::warn!(
                            "Request to {} failed (attempt {}/{}): {}",
                            url,
                            attempt,
                            policy.max_retries + 1,
                            err
                        );
                    }
                }
                outcome
            },
            RetryPolicy::is_retryable,
        )
        .await;

        match result {
            Err(err) if RetryPolicy::is_retryable(&err) => Err(ApiError::RetriesExhausted {
                url: url.to_string(),
                attempts: attempts.load(Ordering::Relaxed),
            }),
            other => other,
        }
    }
}

fn authorize(request: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
    match bearer {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}
