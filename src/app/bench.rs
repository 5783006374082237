use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::args::BenchArgs;
use crate::error::AppResult;
use crate::http::{PlannedRequest, RequestSpec};
use crate::load::{LoadPlan, Pacing, Schedule, run_plan};
use crate::metrics::{BenchmarkResult, compute_benchmark_result};
use crate::report::{benchmark_report, snapshot_lines};
use crate::shutdown::ShutdownReceiver;

use super::{Probes, emit, numbered};

const CACHING_PROMPT: &str = "Hello, test message";
const CACHING_MAX_TOKENS: u32 = 50;
const CONCURRENT_PROMPT: &str = "Concurrent test message";
const CONCURRENT_MAX_TOKENS: u32 = 30;
const STREAMING_PROMPT: &str = "Stream a short response";
const STREAMING_MAX_TOKENS: u32 = 100;

fn bench_plans(model: &str, args: &BenchArgs) -> Vec<LoadPlan> {
    let caching = Arc::new(
        RequestSpec::prompt(model, CACHING_PROMPT, false).with_max_tokens(CACHING_MAX_TOKENS),
    );
    let concurrent = Arc::new(
        RequestSpec::prompt(model, CONCURRENT_PROMPT, false)
            .with_max_tokens(CONCURRENT_MAX_TOKENS),
    );
    let streaming = Arc::new(
        RequestSpec::prompt(model, STREAMING_PROMPT, true).with_max_tokens(STREAMING_MAX_TOKENS),
    );
    let concurrent_total = args.clients.get().saturating_mul(args.per_client.get());

    vec![
        LoadPlan::new(
            "Endpoint Caching",
            numbered(args.requests.get(), |id| {
                PlannedRequest::new(id, format!("cache_{}", id), Arc::clone(&caching))
            }),
            Schedule::Sequential(Pacing {
                delay_between: Duration::ZERO,
                pause_every: Some((args.pause_every.non_zero(), args.pause)),
            }),
        ),
        LoadPlan::new(
            "Concurrent Requests",
            numbered(concurrent_total, |id| {
                PlannedRequest::new(id, format!("client_{}", id), Arc::clone(&concurrent))
            }),
            Schedule::Clients {
                per_client: args.per_client.non_zero(),
            },
        ),
        LoadPlan::new(
            "Streaming Performance",
            numbered(args.streams.get(), |id| {
                PlannedRequest::new(id, format!("stream_{}", id), Arc::clone(&streaming))
            }),
            Schedule::Sequential(Pacing::default()),
        ),
    ]
}

/// Runs the caching, concurrency and streaming benchmarks in order.
///
/// An interrupt stops after the benchmark in progress; the partial results
/// are still reported.
///
/// # Errors
///
/// Returns an error when the report cannot be written to `out`.
pub async fn run_bench<W: Write + Send>(
    probes: &Probes,
    args: &BenchArgs,
    shutdown_rx: &mut ShutdownReceiver,
    out: &mut W,
) -> AppResult<Vec<BenchmarkResult>> {
    let before = match probes.source.fetch_raw_metrics().await {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Initial metrics unavailable: {}", err);
            None
        }
    };
    emit(out, &snapshot_lines("Initial server metrics", before.as_ref()))?;

    let mut results = Vec::new();
    for plan in bench_plans(&probes.model, args) {
        let run = run_plan(Arc::clone(&probes.executor), plan, shutdown_rx).await;
        let result = compute_benchmark_result(&run.name, &run.outcomes, run.planned, run.elapsed);
        info!(
            "{} finished: {:.2} req/s, {:.1}% success",
            result.test_name, result.requests_per_second, result.success_rate
        );
        results.push(result);
        if run.interrupted {
            break;
        }
    }

    let after = probes.source.fetch_raw_metrics().await.ok();
    emit(out, &snapshot_lines("Final server metrics", after.as_ref()))?;
    emit(out, &benchmark_report(&results))?;
    Ok(results)
}
