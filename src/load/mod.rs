//! Scheduling of planned requests and classification of their outcomes.
mod classify;
mod driver;
mod plan;

#[cfg(test)]
mod tests;

pub use classify::{
    RateLimitClass, RateLimitTally, ScenarioVerdict, classify_error_scenario, classify_rate_limit,
    into_scenario_outcome,
};
pub use driver::{LoadRun, pause, run_plan};
pub use plan::{LoadPlan, Pacing, Schedule};
