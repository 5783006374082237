use std::io::Write;
use std::sync::Arc;

use crate::args::SuiteArgs;
use crate::error::AppResult;
use crate::http::{ChatMessage, Expectation, PlannedRequest, RequestSpec};
use crate::load::{
    LoadPlan, LoadRun, Pacing, RateLimitTally, Schedule, into_scenario_outcome, run_plan,
};
use crate::report::{SuiteDetail, SuiteSection, suite_report};
use crate::shutdown::ShutdownReceiver;

use super::{Probes, emit, numbered};

const SUITE_MAX_TOKENS: u32 = 100;
const INVALID_MODEL: &str = "invalid-model";
const LARGE_PROMPTS: [&str; 3] = [
    "Write a detailed explanation of machine learning with examples",
    "Create a comprehensive guide to Python programming",
    "Explain the history of computer science in detail",
];

fn stream_spec(model: &str, prompt: String) -> Arc<RequestSpec> {
    Arc::new(RequestSpec::prompt(model, prompt, true).with_max_tokens(SUITE_MAX_TOKENS))
}

/// Requests the server must refuse, labelled for the report.
pub(super) fn error_scenarios() -> Vec<(&'static str, PlannedRequest)> {
    let empty = RequestSpec {
        model: String::new(),
        messages: Vec::new(),
        stream: true,
        max_tokens: None,
        temperature: None,
    };
    let unknown_model = RequestSpec {
        model: INVALID_MODEL.to_owned(),
        messages: vec![ChatMessage::user("test")],
        stream: true,
        max_tokens: None,
        temperature: None,
    };
    vec![
        ("Invalid request", empty),
        ("Invalid model", unknown_model),
    ]
    .into_iter()
    .zip(0_u64..)
    .map(|((label, spec), id)| {
        let request = PlannedRequest::new(id, format!("error_{}", id), Arc::new(spec))
            .expecting(Expectation::Reject);
        (label, request)
    })
    .collect()
}

fn concurrent_plan(model: &str, args: &SuiteArgs) -> LoadPlan {
    LoadPlan::new(
        "Concurrent Streams",
        numbered(args.concurrent.get(), |id| {
            let prompt = format!("Count to {} slowly with explanations", id.saturating_add(5));
            PlannedRequest::new(id, format!("stream_{}", id), stream_spec(model, prompt))
        }),
        Schedule::FanOut,
    )
}

fn rate_plan(model: &str, args: &SuiteArgs) -> LoadPlan {
    LoadPlan::new(
        "Rate Limiting",
        numbered(args.rate_requests.get(), |id| {
            let prompt = format!("Quick test {}", id);
            PlannedRequest::new(id, format!("rate_{}", id), stream_spec(model, prompt))
        }),
        Schedule::Sequential(Pacing {
            delay_between: args.rate_delay,
            pause_every: None,
        }),
    )
}

fn large_plan(model: &str) -> LoadPlan {
    let requests = LARGE_PROMPTS
        .iter()
        .zip(0_u64..)
        .map(|(prompt, id)| {
            PlannedRequest::new(
                id,
                format!("large_{}", id),
                stream_spec(model, (*prompt).to_owned()),
            )
        })
        .collect();
    LoadPlan::new(
        "Large Responses",
        requests,
        Schedule::Sequential(Pacing::default()),
    )
}

fn scenario_section(run: LoadRun, labels: &[(u64, &str)]) -> SuiteSection {
    let mut outcomes = run.outcomes;
    outcomes.sort_by_key(|outcome| outcome.id);
    let mut verdicts = Vec::with_capacity(outcomes.len());
    let judged = outcomes
        .into_iter()
        .map(|outcome| {
            let label = labels
                .iter()
                .find(|(id, _)| *id == outcome.id)
                .map_or_else(|| outcome.name.clone(), |(_, label)| (*label).to_owned());
            let (scored, verdict) = into_scenario_outcome(outcome);
            verdicts.push((label, verdict));
            scored
        })
        .collect();
    SuiteSection::new(run.name, judged).with_detail(SuiteDetail::Scenarios(verdicts))
}

/// Runs the four suite tests in order and prints the combined report.
///
/// # Errors
///
/// Returns an error when the report cannot be written to `out`.
pub async fn run_suite<W: Write + Send>(
    probes: &Probes,
    args: &SuiteArgs,
    shutdown_rx: &mut ShutdownReceiver,
    out: &mut W,
) -> AppResult<Vec<SuiteSection>> {
    let mut sections = Vec::new();

    let concurrent = run_plan(
        Arc::clone(&probes.executor),
        concurrent_plan(&probes.model, args),
        shutdown_rx,
    )
    .await;
    let mut interrupted = concurrent.interrupted;
    sections.push(SuiteSection::new(concurrent.name, concurrent.outcomes));

    if !interrupted {
        let rate = run_plan(
            Arc::clone(&probes.executor),
            rate_plan(&probes.model, args),
            shutdown_rx,
        )
        .await;
        interrupted = rate.interrupted;
        let tally = RateLimitTally::from_outcomes(&rate.outcomes);
        sections.push(
            SuiteSection::new(rate.name, rate.outcomes).with_detail(SuiteDetail::RateLimit(tally)),
        );
    }

    if !interrupted {
        let large = run_plan(
            Arc::clone(&probes.executor),
            large_plan(&probes.model),
            shutdown_rx,
        )
        .await;
        interrupted = large.interrupted;
        sections.push(SuiteSection::new(large.name, large.outcomes));
    }

    if !interrupted {
        let (labels, requests): (Vec<(u64, &str)>, Vec<PlannedRequest>) = error_scenarios()
            .into_iter()
            .map(|(label, request)| ((request.id, label), request))
            .unzip();
        let plan = LoadPlan::new(
            "Error Scenarios",
            requests,
            Schedule::Sequential(Pacing::default()),
        );
        let scenarios = run_plan(Arc::clone(&probes.executor), plan, shutdown_rx).await;
        sections.push(scenario_section(scenarios, &labels));
    }

    emit(out, &suite_report(&sections))?;
    Ok(sections)
}
