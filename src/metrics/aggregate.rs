use std::time::Duration;

use super::types::{BenchmarkResult, FailureSample, Outcome};

/// Fewer successful samples than this leave the p95 at zero.
pub const P95_MIN_SAMPLES: usize = 20;
/// Failure samples kept per test for the report.
pub const MAX_FAILURE_SAMPLES: usize = 5;

const QUANTILE_PARTS: usize = 20;
const P95_CUT: usize = 19;

fn duration_from_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or_default()
}

fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// 95th percentile using the exclusive interpolation over `n + 1` ranks.
///
/// Returns `0.0` below [`P95_MIN_SAMPLES`] samples.
#[must_use]
pub fn percentile_95(samples: &[f64]) -> f64 {
    let len = samples.len();
    if len < P95_MIN_SAMPLES {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let ranks = len.saturating_add(1);
    let scaled = P95_CUT.saturating_mul(ranks);
    let index = (scaled / QUANTILE_PARTS).clamp(1, len.saturating_sub(1));
    let delta = scaled.saturating_sub(index.saturating_mul(QUANTILE_PARTS));
    let lower = sorted.get(index.saturating_sub(1)).copied().unwrap_or(0.0);
    let upper = sorted.get(index).copied().unwrap_or(lower);
    let weight_lower = QUANTILE_PARTS.saturating_sub(delta) as f64;
    (lower * weight_lower + upper * delta as f64) / QUANTILE_PARTS as f64
}

/// Folds a batch of outcomes into one [`BenchmarkResult`].
///
/// `planned_total` counts requests that were planned but never recorded
/// (interrupted runs) as failures. Timing figures only cover successes.
#[must_use]
pub fn compute_benchmark_result(
    test_name: &str,
    outcomes: &[Outcome],
    planned_total: usize,
    wall_clock: Duration,
) -> BenchmarkResult {
    let total = planned_total.max(outcomes.len()) as u64;
    let successes: Vec<f64> = outcomes
        .iter()
        .filter(|outcome| outcome.success)
        .map(|outcome| outcome.duration.as_secs_f64())
        .collect();
    let successful = successes.len() as u64;
    let failed = total.saturating_sub(successful);

    let span = wall_clock.as_secs_f64();
    let requests_per_second = if span > 0.0 {
        successful as f64 / span
    } else {
        0.0
    };
    let success_rate = if total > 0 {
        successful as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let failures = outcomes
        .iter()
        .filter(|outcome| !outcome.success)
        .take(MAX_FAILURE_SAMPLES)
        .map(FailureSample::from_outcome)
        .collect();

    BenchmarkResult {
        test_name: test_name.to_owned(),
        requests_per_second,
        average_response_time: duration_from_secs(mean(&successes)),
        p95_response_time: duration_from_secs(percentile_95(&successes)),
        success_rate,
        total_requests: total,
        successful_requests: successful,
        failed_requests: failed,
        failures,
    }
}

/// Totals for one suite test, including streaming throughput.
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub success_rate: f64,
    pub average_response_time: Duration,
    pub max_response_time: Duration,
    pub min_response_time: Duration,
    pub total_chunks: u64,
    pub total_bytes: u64,
    pub throughput_chunks_per_sec: f64,
    pub throughput_bytes_per_sec: f64,
}

/// Suite view of a batch.
///
/// Timing covers every outcome with a positive duration and the counters
/// include partial progress of failed requests.
#[must_use]
pub fn compute_suite_metrics(outcomes: &[Outcome]) -> SuiteMetrics {
    let total = outcomes.len() as u64;
    let successful = outcomes.iter().filter(|outcome| outcome.success).count() as u64;

    let durations: Vec<Duration> = outcomes
        .iter()
        .map(|outcome| outcome.duration)
        .filter(|duration| !duration.is_zero())
        .collect();
    let secs: Vec<f64> = durations.iter().map(Duration::as_secs_f64).collect();
    let busy_secs: f64 = secs.iter().sum();
    let total_chunks: u64 = outcomes.iter().map(|outcome| outcome.chunks_received).sum();
    let total_bytes: u64 = outcomes.iter().map(|outcome| outcome.bytes_received).sum();
    let per_busy_second = |count: u64| {
        if busy_secs > 0.0 {
            count as f64 / busy_secs
        } else {
            0.0
        }
    };

    SuiteMetrics {
        total_requests: total,
        successful_requests: successful,
        failed_requests: total.saturating_sub(successful),
        success_rate: if total > 0 {
            successful as f64 / total as f64 * 100.0
        } else {
            0.0
        },
        average_response_time: duration_from_secs(mean(&secs)),
        max_response_time: durations.iter().copied().max().unwrap_or_default(),
        min_response_time: durations.iter().copied().min().unwrap_or_default(),
        total_chunks,
        total_bytes,
        throughput_chunks_per_sec: per_busy_second(total_chunks),
        throughput_bytes_per_sec: per_busy_second(total_bytes),
    }
}
