use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::http::{PlannedRequest, RequestExecutor};
use crate::metrics::Outcome;
use crate::shutdown::{ShutdownReceiver, wait_for_shutdown};

use super::plan::{LoadPlan, Pacing, Schedule};

/// Outcomes of one plan. `outcomes` is in completion order.
#[derive(Debug, Clone)]
pub struct LoadRun {
    pub name: String,
    pub outcomes: Vec<Outcome>,
    pub planned: usize,
    pub elapsed: Duration,
    pub interrupted: bool,
}

/// Sleeps for `duration` unless shutdown comes first; returns `false` then.
pub async fn pause(duration: Duration, shutdown_rx: &mut ShutdownReceiver) -> bool {
    if duration.is_zero() {
        return true;
    }
    tokio::select! {
        () = tokio::time::sleep(duration) => true,
        () = wait_for_shutdown(shutdown_rx) => false,
    }
}

async fn execute_and_send<E>(executor: &E, request: &PlannedRequest, outcome_tx: &mpsc::Sender<Outcome>)
where
    E: RequestExecutor + ?Sized,
{
    let outcome = executor.execute(request).await;
    if outcome_tx.send(outcome).await.is_err() {
        debug!("Collector closed before {} was recorded", request.name);
    }
}

async fn run_sequence<E>(
    executor: Arc<E>,
    requests: Vec<PlannedRequest>,
    pacing: Pacing,
    outcome_tx: mpsc::Sender<Outcome>,
) where
    E: RequestExecutor + ?Sized,
{
    for (index, request) in requests.iter().enumerate() {
        if index > 0 && !pacing.delay_between.is_zero() {
            tokio::time::sleep(pacing.delay_between).await;
        }
        execute_and_send(executor.as_ref(), request, &outcome_tx).await;
        if let Some((every, extra)) = pacing.pause_every
            && index.checked_rem(every.get()) == Some(0)
        {
            tokio::time::sleep(extra).await;
        }
    }
}

fn spawn_schedule<E>(
    executor: &Arc<E>,
    plan: LoadPlan,
    outcome_tx: &mpsc::Sender<Outcome>,
    tasks: &mut JoinSet<()>,
) where
    E: RequestExecutor + ?Sized + 'static,
{
    match plan.schedule {
        Schedule::FanOut => {
            for request in plan.requests {
                let executor = Arc::clone(executor);
                let outcome_tx = outcome_tx.clone();
                tasks.spawn(async move {
                    execute_and_send(executor.as_ref(), &request, &outcome_tx).await;
                });
            }
        }
        Schedule::Bounded { max_in_flight } => {
            let permits = Arc::new(Semaphore::new(max_in_flight.get()));
            for request in plan.requests {
                let executor = Arc::clone(executor);
                let outcome_tx = outcome_tx.clone();
                let permits = Arc::clone(&permits);
                tasks.spawn(async move {
                    let Ok(_permit) = permits.acquire_owned().await else {
                        return;
                    };
                    execute_and_send(executor.as_ref(), &request, &outcome_tx).await;
                });
            }
        }
        Schedule::Clients { per_client } => {
            let mut remaining = plan.requests;
            while !remaining.is_empty() {
                let rest = remaining.split_off(per_client.get().min(remaining.len()));
                let batch = std::mem::replace(&mut remaining, rest);
                tasks.spawn(run_sequence(
                    Arc::clone(executor),
                    batch,
                    Pacing::default(),
                    outcome_tx.clone(),
                ));
            }
        }
        Schedule::Sequential(pacing) => {
            tasks.spawn(run_sequence(
                Arc::clone(executor),
                plan.requests,
                pacing,
                outcome_tx.clone(),
            ));
        }
    }
}

/// Runs every request of `plan` and collects the outcomes on one task.
///
/// On shutdown the in-flight requests are aborted and whatever was already
/// recorded is returned with `interrupted` set.
pub async fn run_plan<E>(
    executor: Arc<E>,
    plan: LoadPlan,
    shutdown_rx: &mut ShutdownReceiver,
) -> LoadRun
where
    E: RequestExecutor + ?Sized + 'static,
{
    let name = plan.name.clone();
    let planned = plan.len();
    info!(
        "Running {}: {} requests, up to {} in flight",
        name,
        planned,
        plan.max_in_flight()
    );
    let started = Instant::now();
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<Outcome>(planned.max(1));
    let mut tasks = JoinSet::new();
    spawn_schedule(&executor, plan, &outcome_tx, &mut tasks);
    drop(outcome_tx);

    let mut outcomes = Vec::with_capacity(planned);
    let mut interrupted = false;
    loop {
        tokio::select! {
            biased;
            received = outcome_rx.recv() => match received {
                Some(outcome) => outcomes.push(outcome),
                None => break,
            },
            () = wait_for_shutdown(shutdown_rx) => {
                interrupted = true;
                break;
            }
        }
    }

    if interrupted {
        tasks.abort_all();
        outcome_rx.close();
        while let Ok(outcome) = outcome_rx.try_recv() {
            outcomes.push(outcome);
        }
        warn!(
            "{} interrupted after {} of {} requests",
            name,
            outcomes.len(),
            planned
        );
    }
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined
            && !err.is_cancelled()
        {
            warn!("Request task failed: {}", err);
        }
    }

    LoadRun {
        name,
        outcomes,
        planned,
        elapsed: started.elapsed(),
        interrupted,
    }
}
