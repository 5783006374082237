use crate::load::{RateLimitTally, ScenarioVerdict};
use crate::metrics::{
    FailureSample, MAX_FAILURE_SAMPLES, Outcome, RatingInput, RatingTier, SUITE_RATING,
    SuiteMetrics, classify_rating, compute_suite_metrics,
};

use super::{millis, rule};

const BYTES_PER_KB: f64 = 1024.0;

/// Classification printed under a test besides its metrics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SuiteDetail {
    #[default]
    None,
    RateLimit(RateLimitTally),
    Scenarios(Vec<(String, ScenarioVerdict)>),
}

/// One suite test with the outcomes it collected.
#[derive(Debug, Clone)]
pub struct SuiteSection {
    pub name: String,
    pub outcomes: Vec<Outcome>,
    pub detail: SuiteDetail,
}

impl SuiteSection {
    #[must_use]
    pub fn new<S: Into<String>>(name: S, outcomes: Vec<Outcome>) -> Self {
        Self {
            name: name.into(),
            outcomes,
            detail: SuiteDetail::None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: SuiteDetail) -> Self {
        self.detail = detail;
        self
    }
}

#[must_use]
pub fn suite_section_lines(section: &SuiteSection) -> Vec<String> {
    let metrics = compute_suite_metrics(&section.outcomes);
    let mut lines = vec![
        format!("{} Results:", section.name),
        format!("   Total Tests: {}", metrics.total_requests),
        format!("   Successful: {}", metrics.successful_requests),
        format!("   Failed: {}", metrics.failed_requests),
        format!("   Success Rate: {:.1}%", metrics.success_rate),
        format!(
            "   Average Duration: {:.2}s",
            metrics.average_response_time.as_secs_f64()
        ),
        format!(
            "   Min/Max Duration: {:.2}s / {:.2}s",
            metrics.min_response_time.as_secs_f64(),
            metrics.max_response_time.as_secs_f64()
        ),
        format!("   Total Chunks: {}", metrics.total_chunks),
        format!("   Total Bytes: {}", metrics.total_bytes),
        format!(
            "   Throughput: {:.1} chunks/s, {:.1} bytes/s",
            metrics.throughput_chunks_per_sec, metrics.throughput_bytes_per_sec
        ),
    ];

    match &section.detail {
        SuiteDetail::None => {}
        SuiteDetail::RateLimit(tally) => {
            lines.push(format!(
                "   Succeeded / Rate Limited / Failed: {} / {} / {}",
                tally.succeeded, tally.rate_limited, tally.failed
            ));
        }
        SuiteDetail::Scenarios(verdicts) => {
            lines.extend(verdicts.iter().map(|(name, verdict)| {
                let mark = if verdict.passed() { "PASS" } else { "FAIL" };
                format!("   {}: {} ({})", name, mark, verdict)
            }));
        }
    }

    let failures: Vec<FailureSample> = section
        .outcomes
        .iter()
        .filter(|outcome| !outcome.success)
        .take(MAX_FAILURE_SAMPLES)
        .map(FailureSample::from_outcome)
        .collect();
    if !failures.is_empty() {
        lines.push("   Failed Tests:".to_owned());
        lines.extend(
            failures
                .iter()
                .map(|failure| format!("     - {}: {}", failure.name, failure.message)),
        );
    }
    lines
}

/// Metrics over every outcome of the suite, with its rating.
#[derive(Debug, Clone, PartialEq)]
pub struct OverallSuite {
    pub metrics: SuiteMetrics,
    pub rating: RatingTier,
}

#[must_use]
pub fn overall_suite(sections: &[SuiteSection]) -> OverallSuite {
    let all: Vec<Outcome> = sections
        .iter()
        .flat_map(|section| section.outcomes.iter().cloned())
        .collect();
    let metrics = compute_suite_metrics(&all);
    let rating = classify_rating(
        SUITE_RATING,
        &RatingInput {
            response_time_ms: millis(metrics.average_response_time),
            success_rate: metrics.success_rate,
            memory_mb: None,
            requests_per_second: None,
        },
    );
    OverallSuite { metrics, rating }
}

#[must_use]
pub fn suite_report(sections: &[SuiteSection]) -> Vec<String> {
    let mut lines = Vec::new();
    for section in sections {
        lines.push(String::new());
        lines.extend(suite_section_lines(section));
    }

    let overall = overall_suite(sections);
    lines.push(String::new());
    lines.push("Overall Performance Summary:".to_owned());
    lines.push(rule());
    lines.push(format!("Total Tests: {}", overall.metrics.total_requests));
    lines.push(format!(
        "Overall Success Rate: {:.1}%",
        overall.metrics.success_rate
    ));
    lines.push(format!(
        "Average Response Time: {:.2}s",
        overall.metrics.average_response_time.as_secs_f64()
    ));
    lines.push(format!(
        "Total Throughput: {:.1} chunks/s",
        overall.metrics.throughput_chunks_per_sec
    ));
    lines.push(format!(
        "Data Processed: {:.1} KB",
        overall.metrics.total_bytes as f64 / BYTES_PER_KB
    ));
    lines.push(format!("Performance Rating: {}", overall.rating));
    lines
}
