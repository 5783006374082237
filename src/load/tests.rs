use super::*;
use crate::error::{AppError, AppResult, OutcomeError};
use crate::http::{
    ClientSettings, Expectation, HttpExecutor, PlannedRequest, RequestExecutor, RequestSpec,
    Target, build_client,
};
use crate::metrics::{Outcome, OutcomeKind};
use crate::shutdown::shutdown_channel;
use crate::test_support::{StubServer, default_routes, run_async_test};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

fn outcome_with(id: u64, status: u16, success: bool, error_indicator: bool) -> Outcome {
    Outcome {
        id,
        name: format!("req_{}", id),
        kind: OutcomeKind::Streaming,
        status,
        success,
        duration: Duration::from_millis(5),
        chunks_received: 0,
        bytes_received: 0,
        malformed_chunks: 0,
        content: String::new(),
        error_indicator,
        error: if success {
            None
        } else if status == 0 {
            Some(OutcomeError::Transport {
                message: "connection refused".to_owned(),
                timed_out: false,
            })
        } else {
            Some(OutcomeError::ServerOpaque { status })
        },
    }
}

/// Executor that sleeps and records the peak number of concurrent calls.
struct CountingExecutor {
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl CountingExecutor {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RequestExecutor for CountingExecutor {
    async fn execute(&self, request: &PlannedRequest) -> Outcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome_with(request.id, 200, true, false)
    }
}

fn requests(count: u64, stream: bool) -> Vec<PlannedRequest> {
    let spec = Arc::new(RequestSpec::prompt("gpt-4", "Count slowly", stream));
    (0..count)
        .map(|id| PlannedRequest::new(id, format!("stream_{}", id), Arc::clone(&spec)))
        .collect()
}

fn non_zero(value: usize) -> AppResult<NonZeroUsize> {
    NonZeroUsize::new(value).ok_or_else(|| AppError::validation("Expected non-zero value"))
}

fn ids(run: &LoadRun) -> BTreeSet<u64> {
    run.outcomes.iter().map(|outcome| outcome.id).collect()
}

#[test]
fn fan_out_records_every_request_once() -> AppResult<()> {
    run_async_test(async {
        let server = StubServer::start(default_routes()).await?;
        let target = Target::parse(&server.url)?;
        let client = build_client(&ClientSettings {
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(2),
        })?;
        let executor = Arc::new(HttpExecutor::new(client, &target));
        let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();

        let plan = LoadPlan::new("Concurrent Streams", requests(50, true), Schedule::FanOut);
        let run = run_plan(executor, plan, &mut shutdown_rx).await;

        if run.outcomes.len() != 50 || run.planned != 50 || run.interrupted {
            return Err(AppError::validation(format!(
                "Expected 50 outcomes, got {}",
                run.outcomes.len()
            )));
        }
        let expected: BTreeSet<u64> = (0..50).collect();
        if ids(&run) != expected {
            return Err(AppError::validation("Expected ids 0..49 exactly once"));
        }
        if run.outcomes.iter().any(|outcome| !outcome.success) {
            return Err(AppError::validation("Expected every stream to succeed"));
        }
        if server.hits() != 50 {
            return Err(AppError::validation("Expected one connection per request"));
        }
        Ok(())
    })
}

#[test]
fn bounded_schedule_caps_in_flight() -> AppResult<()> {
    run_async_test(async {
        let executor = CountingExecutor::new(Duration::from_millis(20));
        let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let plan = LoadPlan::new(
            "bounded",
            requests(9, true),
            Schedule::Bounded {
                max_in_flight: non_zero(3)?,
            },
        );
        let run = run_plan(Arc::clone(&executor), plan, &mut shutdown_rx).await;
        if run.outcomes.len() != 9 {
            return Err(AppError::validation("Expected nine outcomes"));
        }
        if executor.peak() > 3 || executor.peak() == 0 {
            return Err(AppError::validation(format!(
                "Unexpected peak concurrency {}",
                executor.peak()
            )));
        }
        Ok(())
    })
}

#[test]
fn clients_schedule_runs_one_sequence_per_client() -> AppResult<()> {
    run_async_test(async {
        let executor = CountingExecutor::new(Duration::from_millis(10));
        let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let plan = LoadPlan::new(
            "clients",
            requests(12, false),
            Schedule::Clients {
                per_client: non_zero(4)?,
            },
        );
        if plan.max_in_flight() != 3 {
            return Err(AppError::validation("Expected three clients"));
        }
        let run = run_plan(Arc::clone(&executor), plan, &mut shutdown_rx).await;
        let expected: BTreeSet<u64> = (0..12).collect();
        if ids(&run) != expected {
            return Err(AppError::validation("Expected all client requests"));
        }
        if executor.peak() > 3 {
            return Err(AppError::validation("Clients must not overlap their own requests"));
        }
        Ok(())
    })
}

#[test]
fn sequential_schedule_applies_pacing() -> AppResult<()> {
    run_async_test(async {
        let executor = CountingExecutor::new(Duration::ZERO);
        let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let pacing = Pacing {
            delay_between: Duration::from_millis(20),
            pause_every: Some((non_zero(2)?, Duration::from_millis(30))),
        };
        let plan = LoadPlan::new("paced", requests(4, true), Schedule::Sequential(pacing));
        let started = Instant::now();
        let run = run_plan(Arc::clone(&executor), plan, &mut shutdown_rx).await;
        // 3 gaps of 20ms plus pauses after indexes 0 and 2.
        if started.elapsed() < Duration::from_millis(120) {
            return Err(AppError::validation(format!(
                "Pacing too short: {:?}",
                started.elapsed()
            )));
        }
        if run.outcomes.len() != 4 || executor.peak() != 1 {
            return Err(AppError::validation("Expected strictly sequential requests"));
        }
        let order: Vec<u64> = run.outcomes.iter().map(|outcome| outcome.id).collect();
        if order != vec![0, 1, 2, 3] {
            return Err(AppError::validation("Expected dispatch order"));
        }
        Ok(())
    })
}

#[test]
fn shutdown_keeps_partial_outcomes() -> AppResult<()> {
    run_async_test(async {
        let executor = CountingExecutor::new(Duration::from_millis(50));
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let plan = LoadPlan::new(
            "interrupted",
            requests(10, true),
            Schedule::Sequential(Pacing::default()),
        );
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(120)).await;
            drop(shutdown_tx.send(()));
        });
        let started = Instant::now();
        let run = run_plan(executor, plan, &mut shutdown_rx).await;
        if !run.interrupted {
            return Err(AppError::validation("Expected interrupted run"));
        }
        if run.outcomes.is_empty() || run.outcomes.len() >= 10 {
            return Err(AppError::validation(format!(
                "Expected partial outcomes, got {}",
                run.outcomes.len()
            )));
        }
        if started.elapsed() > Duration::from_millis(400) {
            return Err(AppError::validation("Interrupted run kept waiting"));
        }
        Ok(())
    })
}

#[test]
fn pause_returns_false_on_shutdown() -> AppResult<()> {
    run_async_test(async {
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        if shutdown_tx.send(()).is_err() {
            return Err(AppError::validation("Failed to send shutdown"));
        }
        if pause(Duration::from_secs(5), &mut shutdown_rx).await {
            return Err(AppError::validation("Expected pause to be cut short"));
        }
        Ok(())
    })
}

#[test]
fn error_scenario_inverts_success() -> AppResult<()> {
    let clean = classify_error_scenario(&outcome_with(0, 200, true, false));
    if clean.passed() || clean != (ScenarioVerdict::ExpectedFailureMismatch { status: 200 }) {
        return Err(AppError::validation("Clean 200 must fail the scenario"));
    }
    let rejected = classify_error_scenario(&outcome_with(1, 400, false, true));
    if !rejected.passed() {
        return Err(AppError::validation("HTTP 400 must pass the scenario"));
    }
    let marked = classify_error_scenario(&outcome_with(2, 200, true, true));
    if !marked.passed() {
        return Err(AppError::validation("Error marker in 200 must pass"));
    }
    let unreachable = classify_error_scenario(&outcome_with(3, 0, false, false));
    if !matches!(unreachable, ScenarioVerdict::Unreachable { .. }) || !unreachable.passed() {
        return Err(AppError::validation("Transport failure counts as rejection"));
    }
    Ok(())
}

#[test]
fn error_scenario_against_stub_is_rejected() -> AppResult<()> {
    run_async_test(async {
        let server = StubServer::start(default_routes()).await?;
        let target = Target::parse(&server.url)?;
        let client = build_client(&ClientSettings {
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        })?;
        let executor = HttpExecutor::new(client, &target);
        let spec = RequestSpec {
            model: String::new(),
            messages: vec![],
            stream: true,
            max_tokens: None,
            temperature: None,
        };
        let request =
            PlannedRequest::new(0, "error_0", Arc::new(spec)).expecting(Expectation::Reject);
        let verdict = classify_error_scenario(&executor.execute(&request).await);
        if verdict != (ScenarioVerdict::Rejected { status: 400 }) {
            return Err(AppError::validation(format!("Unexpected verdict {}", verdict)));
        }
        Ok(())
    })
}

#[test]
fn rate_limit_tally_separates_429() -> AppResult<()> {
    let outcomes = vec![
        outcome_with(0, 200, true, false),
        outcome_with(1, 429, false, false),
        outcome_with(2, 429, false, false),
        outcome_with(3, 500, false, false),
        outcome_with(4, 0, false, false),
    ];
    let tally = RateLimitTally::from_outcomes(&outcomes);
    if tally
        != (RateLimitTally {
            succeeded: 1,
            rate_limited: 2,
            failed: 2,
        })
    {
        return Err(AppError::validation(format!("Unexpected tally {:?}", tally)));
    }
    let limited = outcomes
        .get(1)
        .ok_or_else(|| AppError::validation("Missing outcome"))?;
    if classify_rate_limit(limited) != RateLimitClass::RateLimited {
        return Err(AppError::validation("Expected 429 to be rate limited"));
    }
    Ok(())
}

#[test]
fn scenario_outcome_reflects_verdict() -> AppResult<()> {
    let (accepted, verdict) = into_scenario_outcome(outcome_with(0, 200, true, false));
    if verdict.passed() || accepted.success {
        return Err(AppError::validation("Clean 200 must fail the scenario"));
    }
    if accepted.error != Some(OutcomeError::ExpectedFailureMismatch { status: 200 }) {
        return Err(AppError::validation(format!(
            "Unexpected error {:?}",
            accepted.error
        )));
    }

    let (rejected, rejected_verdict) = into_scenario_outcome(outcome_with(1, 400, false, false));
    if !rejected.success || rejected.error.is_some() || !rejected_verdict.passed() {
        return Err(AppError::validation("HTTP 400 must pass the scenario"));
    }
    Ok(())
}
