//! Result Fetcher Traits
//!
//! The reveal never talks to the network itself. A host hands a query to a
//! [`ResultFetcher`] and installs whatever structured result comes back.

use async_trait::async_trait;
use thiserror::Error;

use crate::result::{PayloadProblem, StructuredResult};

/// Why a query produced no result
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never got an HTTP response (connect, timeout, TLS)
    #[error("search backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status, with the backend's `detail` if it sent one
    #[error("search backend returned {code}: {detail}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Error detail from the response body, or the status reason
        detail: String,
    },

    /// The backend answered but reported a failed search
    #[error("search failed: {0}")]
    Backend(String),

    /// The response body was not a usable result
    #[error("malformed search response: {0}")]
    MalformedPayload(String),
}

impl From<PayloadProblem> for FetchError {
    fn from(problem: PayloadProblem) -> Self {
        match problem {
            PayloadProblem::Backend(message) => Self::Backend(message),
            PayloadProblem::MissingField(field) => {
                Self::MalformedPayload(format!("missing field `{field}`"))
            }
        }
    }
}

/// Source of structured search results
///
/// Implement this to back the reveal with a different service or with
/// canned data.
#[async_trait]
pub trait ResultFetcher: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Run `query` and return its structured result
    async fn fetch(&self, query: &str) -> Result<StructuredResult, FetchError>;

    /// Check if the backend is reachable and healthy
    async fn health_check(&self) -> bool;
}
