use crate::args::{BenchArgs, LiveArgs, MonitorArgs, ProbeArgs, SuiteArgs};
use crate::http::{ClientSettings, Target};

/// Validated connection settings shared by every tool.
pub(in crate::entry) struct Connection {
    pub(super) target: Target,
    pub(super) settings: ClientSettings,
    pub(super) poll_timeout: std::time::Duration,
    pub(super) model: String,
}

pub(in crate::entry) enum Tool {
    Bench(BenchArgs),
    Suite(SuiteArgs),
    Probe(ProbeArgs),
    Dashboard(LiveArgs),
    Monitor(MonitorArgs),
}

pub(in crate::entry) struct RunPlan {
    pub(super) connection: Connection,
    pub(super) tool: Tool,
    pub(super) no_color: bool,
    /// The tool takes over the terminal in raw mode.
    pub(super) full_screen: bool,
}
