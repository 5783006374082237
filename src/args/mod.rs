//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::{BenchArgs, Command, LiveArgs, MonitorArgs, ProbeArgs, StreamprobeArgs, SuiteArgs};
pub use types::PositiveUsize;

pub(crate) use parsers::duration_from_str;
