//! The batch and live tools, wired from parsed arguments to printed output.
mod bench;
mod live;
mod probe;
mod suite;

#[cfg(test)]
mod tests;

pub use bench::run_bench;
pub use live::{live_renderer, run_dashboard, run_monitor};
pub use probe::{ProbeReport, run_probe};
pub use suite::run_suite;

use std::io::Write;
use std::sync::Arc;

use crate::error::AppResult;
use crate::http::{MetricsSource, PlannedRequest, RequestExecutor};

/// Everything a batch tool needs to talk to the server under test.
#[derive(Clone)]
pub struct Probes {
    pub executor: Arc<dyn RequestExecutor>,
    pub source: Arc<dyn MetricsSource>,
    /// Model id sent with regular traffic.
    pub model: String,
}

impl Probes {
    #[must_use]
    pub fn new<M: Into<String>>(
        executor: Arc<dyn RequestExecutor>,
        source: Arc<dyn MetricsSource>,
        model: M,
    ) -> Self {
        Self {
            executor,
            source,
            model: model.into(),
        }
    }
}

fn numbered<F>(count: usize, build: F) -> Vec<PlannedRequest>
where
    F: FnMut(u64) -> PlannedRequest,
{
    (0..count as u64).map(build).collect()
}

fn emit<W: Write>(out: &mut W, lines: &[String]) -> AppResult<()> {
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(())
}
