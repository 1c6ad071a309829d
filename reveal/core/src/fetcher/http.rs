//! HTTP Search Backend
//!
//! Fetcher for the DeepSearch HTTP service.
//!
//! # API
//!
//! - `POST /query` with `{"user_input": "..."}` - run a search; errors come
//!   back as 4xx/5xx with `{"detail": "..."}`
//! - `GET /` - health probe, answers `{"status": "ok"}`

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::traits::{FetchError, ResultFetcher};
use crate::config::RevealConfig;
use crate::result::{QueryRequest, SearchResponse, StructuredResult};

/// Timeout for the health probe, independent of the search timeout
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Error body of a rejected request
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Health probe body
#[derive(Deserialize)]
struct HealthBody {
    status: String,
}

/// DeepSearch HTTP client
#[derive(Clone, Debug)]
pub struct HttpResultFetcher {
    /// Base URL without trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpResultFetcher {
    /// Create a fetcher for the service at `base_url`
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// Create from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: &RevealConfig) -> Result<Self, FetchError> {
        Self::new(config.api_base_url.clone(), config.request_timeout)
    }

    /// Base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn query_url(&self) -> String {
        format!("{}/query", self.base_url)
    }

    fn health_url(&self) -> String {
        format!("{}/", self.base_url)
    }
}

#[async_trait]
impl ResultFetcher for HttpResultFetcher {
    fn name(&self) -> &'static str {
        "DeepSearch"
    }

    async fn fetch(&self, query: &str) -> Result<StructuredResult, FetchError> {
        let request = QueryRequest {
            user_input: query.to_string(),
        };

        tracing::debug!(url = %self.query_url(), "sending search query");

        let response = self
            .http_client
            .post(self.query_url())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string());
            tracing::warn!(code = status.as_u16(), %detail, "search request rejected");
            return Err(FetchError::Status {
                code: status.as_u16(),
                detail,
            });
        }

        let body = response.text().await?;
        let payload: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::MalformedPayload(e.to_string()))?;
        let result = payload.into_result()?;

        tracing::info!(
            refined_questions = result.refined_questions.len(),
            citations = result.citations.as_ref().map_or(0, Vec::len),
            "search result received"
        );
        Ok(result)
    }

    async fn health_check(&self) -> bool {
        let response = match self
            .http_client
            .get(self.health_url())
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!(code = response.status().as_u16(), "health probe failed");
                return false;
            }
            Err(e) => {
                tracing::debug!(error = %e, "health probe unreachable");
                return false;
            }
        };

        response
            .json::<HealthBody>()
            .await
            .is_ok_and(|body| body.status == "ok")
    }
}

/// Extract `detail` from an error body; non-string details are rendered as JSON
fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(detail) => Some(detail),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
