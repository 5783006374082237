use std::time::Duration;

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{
    BenchArgs, Command, LiveArgs, PositiveUsize, ProbeArgs, StreamprobeArgs, SuiteArgs,
};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::{
    BenchConfig, ConfigFile, DurationValue, LiveConfig, ProbeConfig, SuiteConfig,
};

/// Applies configuration values to CLI arguments.
///
/// Values given on the command line always win over the file.
///
/// # Errors
///
/// Returns an error when a config value is zero where a positive number is
/// required, or when a duration or model is invalid.
pub fn apply_config(
    args: &mut StreamprobeArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    let sub_matches = matches.subcommand().map(|(_, sub)| sub);
    let given =
        |name: &str| is_cli(matches, name) || sub_matches.is_some_and(|sub| is_cli(sub, name));

    if !given("url")
        && let Some(url) = config.url.as_ref()
    {
        args.url = url.clone();
    }

    if !given("model")
        && let Some(model) = config.model.as_ref()
    {
        let model = model.trim();
        if model.is_empty() {
            return Err(AppError::validation(ValidationError::EmptyModel));
        }
        model.clone_into(&mut args.model);
    }

    if !given("request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = ensure_duration(timeout, "timeout")?;
    }

    if !given("connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = ensure_duration(timeout, "connect_timeout")?;
    }

    if !given("poll_timeout")
        && let Some(timeout) = config.poll_timeout.as_ref()
    {
        args.poll_timeout = ensure_duration(timeout, "poll_timeout")?;
    }

    if !given("verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    if !given("no_color")
        && matches.value_source("no_color") != Some(ValueSource::EnvVariable)
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    let Some(sub) = sub_matches else {
        return Ok(());
    };
    match &mut args.command {
        Command::Bench(bench) => {
            if let Some(section) = config.bench.as_ref() {
                apply_bench(bench, sub, section)?;
            }
        }
        Command::Suite(suite) => {
            if let Some(section) = config.suite.as_ref() {
                apply_suite(suite, sub, section)?;
            }
        }
        Command::Probe(probe) => {
            if let Some(section) = config.probe.as_ref() {
                apply_probe(probe, sub, section)?;
            }
        }
        Command::Dashboard(live) => {
            if let Some(section) = config.live.as_ref() {
                apply_live(live, sub, section)?;
            }
        }
        Command::Monitor(monitor) => {
            if let Some(section) = config.live.as_ref() {
                apply_live(&mut monitor.live, sub, section)?;
                if !is_cli(sub, "history_max")
                    && let Some(value) = section.history_max
                {
                    monitor.history_max = ensure_positive_usize(value, "live.history_max")?;
                }
                if !is_cli(sub, "window")
                    && let Some(value) = section.window
                {
                    monitor.window = ensure_positive_usize(value, "live.window")?;
                }
                if !is_cli(sub, "log_dir")
                    && let Some(dir) = section.log_dir.as_ref()
                {
                    monitor.log_dir = dir.clone();
                }
            }
        }
    }
    Ok(())
}

fn apply_bench(
    args: &mut BenchArgs,
    matches: &ArgMatches,
    config: &BenchConfig,
) -> AppResult<()> {
    if !is_cli(matches, "requests")
        && let Some(value) = config.requests
    {
        args.requests = ensure_positive_usize(value, "bench.requests")?;
    }
    if !is_cli(matches, "pause_every")
        && let Some(value) = config.pause_every
    {
        args.pause_every = ensure_positive_usize(value, "bench.pause_every")?;
    }
    if !is_cli(matches, "pause")
        && let Some(value) = config.pause.as_ref()
    {
        args.pause = ensure_duration(value, "bench.pause")?;
    }
    if !is_cli(matches, "clients")
        && let Some(value) = config.clients
    {
        args.clients = ensure_positive_usize(value, "bench.clients")?;
    }
    if !is_cli(matches, "per_client")
        && let Some(value) = config.per_client
    {
        args.per_client = ensure_positive_usize(value, "bench.per_client")?;
    }
    if !is_cli(matches, "streams")
        && let Some(value) = config.streams
    {
        args.streams = ensure_positive_usize(value, "bench.streams")?;
    }
    Ok(())
}

fn apply_suite(
    args: &mut SuiteArgs,
    matches: &ArgMatches,
    config: &SuiteConfig,
) -> AppResult<()> {
    if !is_cli(matches, "concurrent")
        && let Some(value) = config.concurrent
    {
        args.concurrent = ensure_positive_usize(value, "suite.concurrent")?;
    }
    if !is_cli(matches, "rate_requests")
        && let Some(value) = config.rate_requests
    {
        args.rate_requests = ensure_positive_usize(value, "suite.rate_requests")?;
    }
    if !is_cli(matches, "rate_delay")
        && let Some(value) = config.rate_delay.as_ref()
    {
        args.rate_delay = ensure_duration(value, "suite.rate_delay")?;
    }
    Ok(())
}

fn apply_probe(
    args: &mut ProbeArgs,
    matches: &ArgMatches,
    config: &ProbeConfig,
) -> AppResult<()> {
    if !is_cli(matches, "burst")
        && let Some(value) = config.burst
    {
        args.burst = ensure_positive_usize(value, "probe.burst")?;
    }
    if !is_cli(matches, "reset_pause")
        && let Some(value) = config.reset_pause.as_ref()
    {
        args.reset_pause = ensure_duration(value, "probe.reset_pause")?;
    }
    if !is_cli(matches, "streams")
        && let Some(value) = config.streams
    {
        args.streams = ensure_positive_usize(value, "probe.streams")?;
    }
    if !is_cli(matches, "no_integrity")
        && let Some(value) = config.no_integrity
    {
        args.no_integrity = value;
    }
    Ok(())
}

fn apply_live(args: &mut LiveArgs, matches: &ArgMatches, config: &LiveConfig) -> AppResult<()> {
    if !is_cli(matches, "interval")
        && let Some(value) = config.interval.as_ref()
    {
        args.interval = ensure_duration(value, "live.interval")?;
    }
    if !is_cli(matches, "plain")
        && let Some(value) = config.plain
    {
        args.plain = value;
    }
    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_usize(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_duration(value: &DurationValue, field: &str) -> AppResult<Duration> {
    value.to_duration().map_err(|err| {
        AppError::config(ConfigError::InvalidDuration {
            field: field.to_owned(),
            source: err,
        })
    })
}
