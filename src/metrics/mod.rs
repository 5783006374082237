//! Outcome records, server snapshots, and the pure aggregation over them.
mod aggregate;
mod lenient;
mod rating;
mod snapshot;
mod trend;
mod types;
mod window;


pub use aggregate::{
    MAX_FAILURE_SAMPLES, P95_MIN_SAMPLES, SuiteMetrics, compute_benchmark_result,
    compute_suite_metrics, percentile_95,
};
pub use rating::{
    BENCHMARK_RATING, Indicator, IndicatorLevel, MONITOR_RATING, RatingInput, RatingRow,
    RatingTier, SUITE_RATING, capacity_indicator, classify_rating, memory_indicator,
    success_indicator,
};
pub use snapshot::{
    ConnectionPoolStats, HealthStatus, MemoryStats, MetricsSnapshot, PerformanceStats,
    RateLimitStats, StreamStats, UptimeStats,
};
pub use trend::{Trend, TrendDeltas, compute_trend, counter_trend};
pub use types::{BenchmarkResult, FailureSample, Outcome, OutcomeKind};
pub use window::{
    DEFAULT_HISTORY_MAX, DEFAULT_TREND_WINDOW, PerformanceTrends, RecordedSnapshot,
    SnapshotHistory, compute_window_trends,
};

/// Bytes per mebibyte, used for every memory figure shown in MB.
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
