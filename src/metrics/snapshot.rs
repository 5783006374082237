use serde::{Deserialize, Serialize};

use super::lenient;

/// One read of the server's `/metrics` document.
///
/// Every group and field is optional on the wire; absent values decode to
/// empty strings or zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsSnapshot {
    pub uptime: UptimeStats,
    pub streams: StreamStats,
    pub performance: PerformanceStats,
    pub memory: MemoryStats,
    pub rate_limiting: RateLimitStats,
    pub connection_pool: ConnectionPoolStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UptimeStats {
    pub human: String,
    #[serde(deserialize_with = "lenient::gauge")]
    pub hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamStats {
    #[serde(deserialize_with = "lenient::counter")]
    pub active: u64,
    #[serde(deserialize_with = "lenient::counter")]
    pub max_concurrent: u64,
    #[serde(deserialize_with = "lenient::counter")]
    pub peak_concurrent: u64,
    #[serde(deserialize_with = "lenient::counter")]
    pub total: u64,
    #[serde(deserialize_with = "lenient::counter")]
    pub successful: u64,
    #[serde(deserialize_with = "lenient::counter")]
    pub failed: u64,
    #[serde(deserialize_with = "lenient::gauge")]
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceStats {
    #[serde(deserialize_with = "lenient::counter")]
    pub total_chunks: u64,
    #[serde(deserialize_with = "lenient::counter")]
    pub total_bytes: u64,
    /// Milliseconds.
    #[serde(deserialize_with = "lenient::gauge")]
    pub average_stream_duration: f64,
    #[serde(deserialize_with = "lenient::gauge")]
    pub chunks_per_second: f64,
    #[serde(deserialize_with = "lenient::gauge")]
    pub bytes_per_second: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryStats {
    #[serde(deserialize_with = "lenient::counter")]
    pub heap_used: u64,
    #[serde(deserialize_with = "lenient::counter")]
    pub heap_total: u64,
    #[serde(deserialize_with = "lenient::counter")]
    pub rss: u64,
    #[serde(deserialize_with = "lenient::counter")]
    pub external: u64,
}

impl MemoryStats {
    /// Heap usage in percent, `None` when the heap total is unknown.
    #[must_use]
    pub fn heap_usage_percent(&self) -> Option<f64> {
        if self.heap_total == 0 {
            return None;
        }
        Some(self.heap_used as f64 / self.heap_total as f64 * 100.0)
    }

    #[must_use]
    pub fn heap_used_mb(&self) -> f64 {
        self.heap_used as f64 / super::BYTES_PER_MB
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateLimitStats {
    #[serde(deserialize_with = "lenient::counter")]
    pub active_clients: u64,
    #[serde(deserialize_with = "lenient::counter")]
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionPoolStats {
    #[serde(deserialize_with = "lenient::counter")]
    pub active_connections: u64,
    #[serde(deserialize_with = "lenient::counter")]
    pub pending_requests: u64,
    #[serde(deserialize_with = "lenient::counter")]
    pub total_requests: u64,
    #[serde(deserialize_with = "lenient::counter")]
    pub total_errors: u64,
    /// Milliseconds.
    #[serde(deserialize_with = "lenient::gauge")]
    pub average_response_time: f64,
}

/// Body of `GET /`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    pub version: String,
}
