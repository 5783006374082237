use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_HISTORY_MAX, DEFAULT_INTERVAL, DEFAULT_LOG_DIR,
    DEFAULT_MODEL, DEFAULT_POLL_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, DEFAULT_TREND_WINDOW,
    DEFAULT_URL,
};
use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_model, parse_positive_usize,
};
use super::types::PositiveUsize;

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Benchmark endpoint caching, concurrent clients and streaming throughput
    Bench(BenchArgs),
    /// Run the streaming test suite (concurrency, rate limits, large responses, errors)
    Suite(SuiteArgs),
    /// Probe rate limiting, concurrent streams, error handling and stream integrity
    Probe(ProbeArgs),
    /// Live dashboard over the server's /metrics endpoint
    Dashboard(LiveArgs),
    /// Live monitor that keeps every snapshot and dumps them on exit
    Monitor(MonitorArgs),
}

#[derive(Debug, Args, Clone)]
pub struct BenchArgs {
    /// Sequential non-streaming requests in the caching benchmark
    #[arg(long = "requests", default_value = "100", value_parser = parse_positive_usize)]
    pub requests: PositiveUsize,

    /// Pause after every N-th caching request
    #[arg(long = "pause-every", default_value = "10", value_parser = parse_positive_usize)]
    pub pause_every: PositiveUsize,

    /// Length of the caching pause (supports ms/s/m/h)
    #[arg(long = "pause", default_value = "100ms", value_parser = parse_duration_arg)]
    pub pause: Duration,

    /// Concurrent clients in the concurrency benchmark
    #[arg(long = "clients", default_value = "20", value_parser = parse_positive_usize)]
    pub clients: PositiveUsize,

    /// Requests issued by each client
    #[arg(long = "per-client", default_value = "10", value_parser = parse_positive_usize)]
    pub per_client: PositiveUsize,

    /// Sequential streams in the streaming benchmark
    #[arg(long = "streams", default_value = "50", value_parser = parse_positive_usize)]
    pub streams: PositiveUsize,
}

#[derive(Debug, Args, Clone)]
pub struct SuiteArgs {
    /// Streams fanned out at once in the concurrency test
    #[arg(long = "concurrent", short = 'c', default_value = "10", value_parser = parse_positive_usize)]
    pub concurrent: PositiveUsize,

    /// Sequential requests in the rate limiting test
    #[arg(long = "rate-requests", default_value = "5", value_parser = parse_positive_usize)]
    pub rate_requests: PositiveUsize,

    /// Delay between rate limiting requests (supports ms/s/m/h)
    #[arg(long = "rate-delay", default_value = "100ms", value_parser = parse_duration_arg)]
    pub rate_delay: Duration,
}

#[derive(Debug, Args, Clone)]
pub struct ProbeArgs {
    /// Requests sent at once to trigger rate limiting
    #[arg(long = "burst", default_value = "3", value_parser = parse_positive_usize)]
    pub burst: PositiveUsize,

    /// Wait for the rate limit window to reset (supports ms/s/m/h)
    #[arg(long = "reset-pause", default_value = "2s", value_parser = parse_duration_arg)]
    pub reset_pause: Duration,

    /// Concurrent streams after the burst
    #[arg(long = "streams", default_value = "5", value_parser = parse_positive_usize)]
    pub streams: PositiveUsize,

    /// Skip the long-response stream integrity check
    #[arg(long = "no-integrity")]
    pub no_integrity: bool,
}

#[derive(Debug, Args, Clone)]
pub struct LiveArgs {
    /// Refresh interval (supports ms/s/m/h)
    #[arg(long = "interval", short = 'i', default_value = DEFAULT_INTERVAL, value_parser = parse_duration_arg)]
    pub interval: Duration,

    /// Print each refresh as plain lines instead of the full-screen UI
    #[arg(long = "plain")]
    pub plain: bool,
}

#[derive(Debug, Args, Clone)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub live: LiveArgs,

    /// Snapshots kept in memory before the oldest are dropped
    #[arg(long = "history-max", default_value = DEFAULT_HISTORY_MAX, value_parser = parse_positive_usize)]
    pub history_max: PositiveUsize,

    /// Snapshots averaged for trends and the rating
    #[arg(long = "window", default_value = DEFAULT_TREND_WINDOW, value_parser = parse_positive_usize)]
    pub window: PositiveUsize,

    /// Directory for the performance log written on exit
    #[arg(long = "log-dir", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Performance probes, benchmarks and live dashboards for streaming chat-completion servers."
)]
pub struct StreamprobeArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Base URL of the server under test
    #[arg(long, short, global = true, default_value = DEFAULT_URL)]
    pub url: String,

    /// Model id sent with every chat request
    #[arg(long, global = true, default_value = DEFAULT_MODEL, value_parser = parse_model)]
    pub model: String,

    /// Timeout for each chat request, including the full stream (supports ms/s/m/h)
    #[arg(long = "timeout", global = true, default_value = DEFAULT_REQUEST_TIMEOUT, value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// TCP connect timeout (supports ms/s/m/h)
    #[arg(long = "connect-timeout", global = true, default_value = DEFAULT_CONNECT_TIMEOUT, value_parser = parse_duration_arg)]
    pub connect_timeout: Duration,

    /// Timeout for /metrics and health fetches (supports ms/s/m/h)
    #[arg(long = "poll-timeout", global = true, default_value = DEFAULT_POLL_TIMEOUT, value_parser = parse_duration_arg)]
    pub poll_timeout: Duration,

    /// Config file (TOML or JSON); defaults to ./streamprobe.toml or ./streamprobe.json
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", global = true, env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}

impl StreamprobeArgs {
    /// Whether the selected tool takes over the terminal.
    #[must_use]
    pub const fn full_screen(&self) -> bool {
        match &self.command {
            Command::Dashboard(live) => !live.plain,
            Command::Monitor(monitor) => !monitor.live.plain,
            Command::Bench(_) | Command::Suite(_) | Command::Probe(_) => false,
        }
    }
}
