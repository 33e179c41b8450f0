//! Result-fetching collaborators.
//!
//! A [`ResultSource`] turns a finished query into tabular records. The only
//! implementation shipped is [`MockResultSource`], which simulates latency
//! and returns a fixed set of rows; a real backend implements the same trait.
//!
//! "No results" is `Ok(vec![])`. Failures are [`FetchError`]s, and
//! [`FetchError::is_retryable`] tells transient ones apart so callers can use
//! [`crate::utils::with_retry`].

pub mod mock;

pub use mock::MockResultSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{KeywordCondition, ResultRecord};

/// What a result source receives: the structured inputs plus the query to run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    /// Keyword conditions in order
    pub conditions: Vec<KeywordCondition>,

    /// Raw identifier list text
    pub identifier_text: String,

    /// Authoritative query string at the time of the request
    pub query: String,
}

impl FetchRequest {
    /// Create a request from a query string alone
    pub fn from_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// The ResultSource trait defines the interface for record fetchers.
#[async_trait]
pub trait ResultSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Fetch records for `request`; every record has the same keys
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<ResultRecord>, FetchError>;
}

/// Errors that can occur when fetching results
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Network or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// The backend is temporarily unavailable
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The request cannot be served as given
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl FetchError {
    /// Whether trying again later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Network(_) | FetchError::Timeout | FetchError::Unavailable(_)
        )
    }
}
