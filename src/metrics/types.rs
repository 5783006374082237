use std::time::Duration;

use serde::Serialize;

use crate::error::OutcomeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    NonStreaming,
    Streaming,
}

/// Result of one logical request, immutable once the executor returns it.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Logical request index within its run.
    pub id: u64,
    /// Diagnostic label such as `stream_3` or `rate_0`.
    pub name: String,
    pub kind: OutcomeKind,
    /// HTTP status, or 0 when the server was never reached.
    pub status: u16,
    pub success: bool,
    pub duration: Duration,
    pub chunks_received: u64,
    pub bytes_received: u64,
    pub malformed_chunks: u64,
    /// Concatenated delta text (streaming) or completion text (non-streaming).
    pub content: String,
    /// A 200 body carried an error marker.
    pub error_indicator: bool,
    pub error: Option<OutcomeError>,
}

impl Outcome {
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureSample {
    pub name: String,
    pub message: String,
}

impl FailureSample {
    pub(crate) fn from_outcome(outcome: &Outcome) -> Self {
        Self {
            name: outcome.name.clone(),
            message: outcome
                .error_message()
                .unwrap_or_else(|| format!("status {}", outcome.status)),
        }
    }
}

/// Aggregate over one named test.
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub test_name: String,
    pub requests_per_second: f64,
    pub average_response_time: Duration,
    pub p95_response_time: Duration,
    /// Percentage in `0..=100` of the planned total.
    pub success_rate: f64,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub failures: Vec<FailureSample>,
}
