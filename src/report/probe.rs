use std::time::Duration;

use crate::error::HttpError;
use crate::load::{RateLimitClass, RateLimitTally, ScenarioVerdict, classify_rate_limit};
use crate::metrics::{HealthStatus, Outcome};

/// Characters of streamed content echoed by the integrity check.
pub const CONTENT_SAMPLE_CHARS: usize = 200;

#[must_use]
pub fn burst_lines(outcomes: &[Outcome]) -> Vec<String> {
    let tally = RateLimitTally::from_outcomes(outcomes);
    let mut lines = vec![
        "Rate Limiting:".to_owned(),
        format!("   Successful requests: {}", tally.succeeded),
        format!("   Rate limited requests: {}", tally.rate_limited),
        format!("   Failed requests: {}", tally.failed),
        format!("   Total requests: {}", outcomes.len()),
    ];
    let mut limited: Vec<&Outcome> = outcomes
        .iter()
        .filter(|outcome| classify_rate_limit(outcome) == RateLimitClass::RateLimited)
        .collect();
    limited.sort_by_key(|outcome| outcome.id);
    lines.extend(limited.into_iter().map(|outcome| {
        format!(
            "   Request {} rate limited: {}",
            outcome.id,
            outcome.error_message().unwrap_or_default()
        )
    }));
    lines
}

#[must_use]
pub fn concurrent_lines(outcomes: &[Outcome], elapsed: Duration) -> Vec<String> {
    let mut successful: Vec<&Outcome> = outcomes.iter().filter(|outcome| outcome.success).collect();
    successful.sort_by_key(|outcome| outcome.id);
    let average_chunks = if successful.is_empty() {
        0.0
    } else {
        successful
            .iter()
            .map(|outcome| outcome.chunks_received as f64)
            .sum::<f64>()
            / successful.len() as f64
    };

    let mut lines = vec![
        "Concurrent Streams:".to_owned(),
        format!("   Total time: {:.2}s", elapsed.as_secs_f64()),
        format!("   Successful streams: {}", successful.len()),
        format!("   Average chunks per stream: {:.1}", average_chunks),
    ];
    lines.extend(successful.into_iter().map(|outcome| {
        format!(
            "   Stream {}: {} chunks in {:.2}s",
            outcome.id,
            outcome.chunks_received,
            outcome.duration.as_secs_f64()
        )
    }));
    lines
}

#[must_use]
pub fn scenario_lines(verdicts: &[(String, ScenarioVerdict)]) -> Vec<String> {
    let mut lines = vec!["Error Scenarios:".to_owned()];
    lines.extend(verdicts.iter().map(|(name, verdict)| {
        let mark = if verdict.passed() { "PASS" } else { "FAIL" };
        format!("   {}: {} ({})", name, mark, verdict)
    }));
    lines
}

#[must_use]
pub fn health_lines(health: &Result<HealthStatus, HttpError>) -> Vec<String> {
    let line = match health {
        Ok(status) => format!(
            "   Server is healthy and responsive ({} {})",
            status.status.to_uppercase(),
            status.version
        ),
        Err(err) => format!("   Server health check failed: {}", err),
    };
    vec!["Server Capacity:".to_owned(), line]
}

/// Malformed chunks per well-formed chunk, in percent.
#[must_use]
pub fn malformed_rate(outcome: &Outcome) -> f64 {
    outcome.malformed_chunks as f64 / outcome.chunks_received.max(1) as f64 * 100.0
}

/// Decoder health over one long streamed response.
#[must_use]
pub fn integrity_lines(outcome: &Outcome) -> Vec<String> {
    let mut lines = vec!["Stream Integrity:".to_owned()];
    if !outcome.success {
        lines.push(format!(
            "   Request failed: {}",
            outcome.error_message().unwrap_or_default()
        ));
        return lines;
    }

    let content_chars = outcome.content.chars().count();
    lines.push(format!("   Total chunks: {}", outcome.chunks_received));
    lines.push(format!("   JSON errors: {}", outcome.malformed_chunks));
    lines.push(format!("   Content length: {} characters", content_chars));
    lines.push(format!("   Error rate: {:.1}%", malformed_rate(outcome)));
    if outcome.malformed_chunks == 0 {
        lines.push("   SUCCESS: no JSON parsing errors".to_owned());
    } else {
        lines.push(format!(
            "   WARNING: {} chunks could not be parsed",
            outcome.malformed_chunks
        ));
    }
    if content_chars > 0 {
        let sample: String = outcome.content.chars().take(CONTENT_SAMPLE_CHARS).collect();
        lines.push(format!("   Content sample: {}...", sample));
    }
    lines
}
