use std::io::Write;
use std::sync::Arc;

use tracing::info;

use crate::args::ProbeArgs;
use crate::error::AppResult;
use crate::http::{PlannedRequest, RequestSpec};
use crate::load::{
    LoadPlan, Pacing, ScenarioVerdict, Schedule, into_scenario_outcome, pause, run_plan,
};
use crate::metrics::Outcome;
use crate::report::{
    burst_lines, concurrent_lines, health_lines, integrity_lines, rule, scenario_lines,
};
use crate::shutdown::ShutdownReceiver;

use super::suite::error_scenarios;
use super::{Probes, emit, numbered};

const PROBE_MAX_TOKENS: u32 = 50;
const INTEGRITY_MAX_TOKENS: u32 = 1000;
const INTEGRITY_TEMPERATURE: f64 = 0.7;
const INTEGRITY_PROMPT: &str = "Write a detailed explanation of how machine learning works, \
including key concepts like supervised learning, unsupervised learning, neural networks, and \
deep learning. Make it comprehensive but accessible.";

/// What one probe run observed.
#[derive(Debug, Default)]
pub struct ProbeReport {
    pub burst: Vec<Outcome>,
    pub concurrent: Vec<Outcome>,
    pub scenarios: Vec<(String, ScenarioVerdict)>,
    pub integrity: Option<Outcome>,
    pub interrupted: bool,
}

fn probe_spec(model: &str, prompt: String) -> Arc<RequestSpec> {
    Arc::new(RequestSpec::prompt(model, prompt, true).with_max_tokens(PROBE_MAX_TOKENS))
}

fn burst_plan(model: &str, args: &ProbeArgs) -> LoadPlan {
    LoadPlan::new(
        "Rate Limit Burst",
        numbered(args.burst.get(), |id| {
            let prompt = format!("Quick test {}", id);
            PlannedRequest::new(id, format!("burst_{}", id), probe_spec(model, prompt))
        }),
        Schedule::Bounded {
            max_in_flight: args.burst.non_zero(),
        },
    )
}

fn streams_plan(model: &str, args: &ProbeArgs) -> LoadPlan {
    LoadPlan::new(
        "Concurrent Streams",
        numbered(args.streams.get(), |id| {
            let prompt = format!("Count to {} slowly", id.saturating_add(3));
            PlannedRequest::new(id, format!("stream_{}", id), probe_spec(model, prompt))
        }),
        Schedule::Bounded {
            max_in_flight: args.streams.non_zero(),
        },
    )
}

fn integrity_plan(model: &str) -> LoadPlan {
    let spec = RequestSpec::prompt(model, INTEGRITY_PROMPT, true)
        .with_max_tokens(INTEGRITY_MAX_TOKENS)
        .with_temperature(INTEGRITY_TEMPERATURE);
    LoadPlan::new(
        "Stream Integrity",
        vec![PlannedRequest::new(0, "integrity", Arc::new(spec))],
        Schedule::Sequential(Pacing::default()),
    )
}

/// Burst, reset pause, concurrent streams, error handling, health, and
/// optionally one long stream checked for malformed chunks.
///
/// # Errors
///
/// Returns an error when the report cannot be written to `out`.
pub async fn run_probe<W: Write + Send>(
    probes: &Probes,
    args: &ProbeArgs,
    shutdown_rx: &mut ShutdownReceiver,
    out: &mut W,
) -> AppResult<ProbeReport> {
    let mut report = ProbeReport::default();
    emit(out, &["Streaming Performance Probe".to_owned(), rule()])?;

    let burst = run_plan(
        Arc::clone(&probes.executor),
        burst_plan(&probes.model, args),
        shutdown_rx,
    )
    .await;
    emit(out, &burst_lines(&burst.outcomes))?;
    report.burst = burst.outcomes;
    if burst.interrupted {
        report.interrupted = true;
        return Ok(report);
    }

    info!("Waiting {:?} for the rate limit window to reset", args.reset_pause);
    if !pause(args.reset_pause, shutdown_rx).await {
        report.interrupted = true;
        return Ok(report);
    }

    let streams = run_plan(
        Arc::clone(&probes.executor),
        streams_plan(&probes.model, args),
        shutdown_rx,
    )
    .await;
    emit(out, &[String::new()])?;
    emit(out, &concurrent_lines(&streams.outcomes, streams.elapsed))?;
    report.concurrent = streams.outcomes;
    if streams.interrupted {
        report.interrupted = true;
        return Ok(report);
    }

    let (labels, requests): (Vec<&str>, Vec<PlannedRequest>) =
        error_scenarios().into_iter().unzip();
    let plan = LoadPlan::new(
        "Error Scenarios",
        requests,
        Schedule::Sequential(Pacing::default()),
    );
    let scenarios = run_plan(Arc::clone(&probes.executor), plan, shutdown_rx).await;
    let mut outcomes = scenarios.outcomes;
    outcomes.sort_by_key(|outcome| outcome.id);
    report.scenarios = outcomes
        .into_iter()
        .map(|outcome| {
            let label = usize::try_from(outcome.id)
                .ok()
                .and_then(|index| labels.get(index))
                .map_or_else(|| outcome.name.clone(), |label| (*label).to_owned());
            (label, into_scenario_outcome(outcome).1)
        })
        .collect();
    emit(out, &[String::new()])?;
    emit(out, &scenario_lines(&report.scenarios))?;

    let health = probes.source.fetch_health().await;
    emit(out, &health_lines(&health))?;
    if scenarios.interrupted {
        report.interrupted = true;
        return Ok(report);
    }

    if !args.no_integrity {
        let integrity = run_plan(
            Arc::clone(&probes.executor),
            integrity_plan(&probes.model),
            shutdown_rx,
        )
        .await;
        report.interrupted = integrity.interrupted;
        if let Some(outcome) = integrity.outcomes.into_iter().next() {
            emit(out, &[String::new()])?;
            emit(out, &integrity_lines(&outcome))?;
            report.integrity = Some(outcome);
        }
    }

    emit(out, &[String::new(), "Probe completed.".to_owned()])?;
    Ok(report)
}
