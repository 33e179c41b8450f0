//! Mock result source standing in for a real search backend.

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::models::ResultRecord;
use crate::sources::{FetchError, FetchRequest, ResultSource};

/// Latency simulated by [`MockResultSource::new`]
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(1500);

const ROWS: [(u64, &str, &str); 3] = [
    (1, "Result A", "Complete"),
    (2, "Result B", "Pending"),
    (3, "Result C", "Complete"),
];

/// A mock source that returns three fixed rows after a delay.
///
/// The `value` column is derived from an md5 of the query and row id, so the
/// same query always yields the same numbers. Failures can be queued to
/// exercise retry handling.
#[derive(Debug)]
pub struct MockResultSource {
    delay: Duration,
    failures: Mutex<VecDeque<FetchError>>,
}

impl Default for MockResultSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResultSource {
    /// Create a mock source with the default simulated latency.
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_MOCK_DELAY)
    }

    /// Create a mock source with a custom simulated latency.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Fail the next fetch with `error`; queued failures are used in order.
    pub fn push_failure(&self, error: FetchError) {
        if let Ok(mut guard) = self.failures.lock() {
            guard.push_back(error);
        }
    }

    /// Number of failures still queued.
    pub fn pending_failures(&self) -> usize {
        self.failures.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    fn next_failure(&self) -> Option<FetchError> {
        self.failures.lock().ok()?.pop_front()
    }
}

#[async_trait]
impl ResultSource for MockResultSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Results"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<ResultRecord>, FetchError> {
        tracing::debug!(
            conditions = request.conditions.len(),
            identifiers = %request.identifier_text,
            query = %request.query,
            "Simulating result fetch"
        );

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(error) = self.next_failure() {
            return Err(error);
        }

        if request.query.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(ROWS
            .iter()
            .map(|(id, name, status)| make_record(*id, name, score(&request.query, *id), status))
            .collect())
    }
}

/// Deterministic pseudo-random value in `[0, 100)` with two decimals
fn score(query: &str, id: u64) -> f64 {
    let digest = md5::compute(format!("{}#{}", query, id));
    let raw = u16::from_be_bytes([digest[0], digest[1]]) % 10_000;
    f64::from(raw) / 100.0
}

/// Helper function to build a record in the mock's shape.
pub fn make_record(id: u64, name: &str, value: f64, status: &str) -> ResultRecord {
    let mut record = ResultRecord::new();
    record.insert("id".to_string(), json!(id));
    record.insert("name".to_string(), json!(name));
    record.insert("value".to_string(), json!(value));
    record.insert("status".to_string(), json!(status));
    record
}
