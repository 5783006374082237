use std::time::Duration;

use serde_json::Value;

use crate::metrics::{BENCHMARK_RATING, BenchmarkResult, RatingInput, RatingTier, classify_rating};

use super::{millis, rule};

/// Cross-test averages of a benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct OverallBenchmark {
    pub average_rps: f64,
    pub average_response_time: Duration,
    pub average_success_rate: f64,
    pub rating: RatingTier,
}

/// Mean of the per-test figures, rated with [`BENCHMARK_RATING`].
///
/// Returns `None` when no test ran.
#[must_use]
pub fn overall_benchmark(results: &[BenchmarkResult]) -> Option<OverallBenchmark> {
    if results.is_empty() {
        return None;
    }
    let count = results.len() as f64;
    let average_rps = results
        .iter()
        .map(|result| result.requests_per_second)
        .sum::<f64>()
        / count;
    let average_secs = results
        .iter()
        .map(|result| result.average_response_time.as_secs_f64())
        .sum::<f64>()
        / count;
    let average_success_rate = results
        .iter()
        .map(|result| result.success_rate)
        .sum::<f64>()
        / count;
    let average_response_time = Duration::try_from_secs_f64(average_secs).unwrap_or_default();

    let rating = classify_rating(
        BENCHMARK_RATING,
        &RatingInput {
            response_time_ms: millis(average_response_time),
            success_rate: average_success_rate,
            memory_mb: None,
            requests_per_second: Some(average_rps),
        },
    );
    Some(OverallBenchmark {
        average_rps,
        average_response_time,
        average_success_rate,
        rating,
    })
}

#[must_use]
pub fn benchmark_lines(result: &BenchmarkResult) -> Vec<String> {
    let mut lines = vec![
        format!("{}:", result.test_name),
        format!("   Requests/sec:     {:.2}", result.requests_per_second),
        format!("   Avg Response:     {:.1}ms", millis(result.average_response_time)),
        format!("   P95 Response:     {:.1}ms", millis(result.p95_response_time)),
        format!("   Success Rate:     {:.1}%", result.success_rate),
        format!("   Total Requests:   {}", result.total_requests),
        format!("   Failed Requests:  {}", result.failed_requests),
    ];
    if !result.failures.is_empty() {
        lines.push("   Failures:".to_owned());
        lines.extend(
            result
                .failures
                .iter()
                .map(|failure| format!("     - {}: {}", failure.name, failure.message)),
        );
    }
    lines
}

/// Full benchmark report: every test, then the overall block.
#[must_use]
pub fn benchmark_report(results: &[BenchmarkResult]) -> Vec<String> {
    let mut lines = vec![rule(), "PERFORMANCE BENCHMARK RESULTS".to_owned(), rule()];
    for result in results {
        lines.push(String::new());
        lines.extend(benchmark_lines(result));
    }
    lines.push(String::new());
    match overall_benchmark(results) {
        Some(overall) => {
            lines.push("OVERALL PERFORMANCE:".to_owned());
            lines.push(format!("   Average RPS:      {:.2}", overall.average_rps));
            lines.push(format!(
                "   Average Response: {:.1}ms",
                millis(overall.average_response_time)
            ));
            lines.push(format!(
                "   Average Success:  {:.1}%",
                overall.average_success_rate
            ));
            lines.push(format!("   Performance:      {}", overall.rating));
        }
        None => lines.push("No benchmark completed.".to_owned()),
    }
    lines
}

/// `label` followed by the pretty-printed snapshot, or `{}` when unavailable.
#[must_use]
pub fn snapshot_lines(label: &str, snapshot: Option<&Value>) -> Vec<String> {
    let rendered = snapshot
        .and_then(|value| serde_json::to_string_pretty(value).ok())
        .unwrap_or_else(|| "{}".to_owned());
    let mut body = rendered.lines();
    let first = body.next().unwrap_or("{}");
    let mut lines = vec![format!("{}: {}", label, first)];
    lines.extend(body.map(str::to_owned));
    lines
}
