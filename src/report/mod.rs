//! Text reports printed by the batch tools once their runs complete.
mod bench;
mod probe;
mod suite;


pub use bench::{OverallBenchmark, benchmark_lines, benchmark_report, overall_benchmark, snapshot_lines};
pub use probe::{
    CONTENT_SAMPLE_CHARS, burst_lines, concurrent_lines, health_lines, integrity_lines,
    malformed_rate, scenario_lines,
};
pub use suite::{
    OverallSuite, SuiteDetail, SuiteSection, overall_suite, suite_report, suite_section_lines,
};

use std::time::Duration;

/// Width of the `=` rules framing a report.
pub const RULE_WIDTH: usize = 80;

pub(crate) fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub(crate) fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
