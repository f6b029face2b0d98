//! Search API client
//!
//! One GET per planned query against `<api>/document`. No retries: a failed
//! request drops its record, and only transport failures (connect/timeout)
//! count toward declaring the backend unavailable.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use holdings_common::config::ApiConfig;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;

use crate::model::{QuerySpec, SearchResponse};

const USER_AGENT: &str = concat!("holdings-exchange/", env!("CARGO_PKG_VERSION"));

/// Search API errors
#[derive(Debug, Error)]
pub enum SearchError {
    /// Connection, timeout or other transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("Search API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Body is not a search response
    #[error("Could not decode search response: {0}")]
    Decode(String),
}

impl SearchError {
    pub fn is_transport(&self) -> bool {
        matches!(self, SearchError::Transport(_))
    }
}

/// Anything that can answer a planned query
#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn search(&self, spec: &QuerySpec) -> Result<SearchResponse, SearchError>;
}

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// reqwest-backed search API client
pub struct SearchClient {
    client: reqwest::Client,
    document_url: String,
    sid: String,
    rate_limiter: Option<DirectRateLimiter>,
}

impl SearchClient {
    pub fn new(config: &ApiConfig, sid: &str) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let rate_limiter = config
            .requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));

        Ok(Self {
            client,
            document_url: format!("{}/document", config.url.trim_end_matches('/')),
            sid: sid.to_string(),
            rate_limiter,
        })
    }

    fn query_params(&self, spec: &QuerySpec) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", spec.query.clone()),
            ("size", spec.size.to_string()),
        ];
        if let Some(output) = &spec.output_fields {
            params.push(("output", output.clone()));
        }
        params.push(("facet", spec.facet.clone()));
        params.push(("sid", self.sid.clone()));
        params
    }
}

#[async_trait]
impl SearchApi for SearchClient {
    async fn search(&self, spec: &QuerySpec) -> Result<SearchResponse, SearchError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        tracing::debug!(query = %spec.query, facet = %spec.facet, size = spec.size, "Querying search API");

        let response = self
            .client
            .get(&self.document_url)
            .query(&self.query_params(spec))
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))
    }
}
