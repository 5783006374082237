use super::*;
use crate::args::{Command, StreamprobeArgs};
use crate::error::{AppError, AppResult};
use crate::http::{ClientSettings, HttpExecutor, HttpMetricsSource, Target, build_client};
use crate::shutdown::{ShutdownSender, shutdown_channel};
use crate::test_support::{
    StubRequest, StubResponse, StubRoutes, StubServer, default_routes, run_async_test,
};
use crate::ui::PlainRenderer;
use clap::Parser;
use std::time::Duration;
use tempfile::tempdir;

const RUN_TIMEOUT: Duration = Duration::from_secs(10);

fn probes_for(url: &str) -> AppResult<Probes> {
    let target = Target::parse(url)?;
    let client = build_client(&ClientSettings {
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
    })?;
    let executor: Arc<dyn RequestExecutor> = Arc::new(HttpExecutor::new(client.clone(), &target));
    let source: Arc<dyn MetricsSource> = Arc::new(HttpMetricsSource::new(
        client,
        &target,
        Duration::from_secs(2),
    ));
    Ok(Probes::new(executor, source, "gpt-4"))
}

fn parse_command(argv: &[&str]) -> AppResult<Command> {
    Ok(StreamprobeArgs::try_parse_from(argv)?.command)
}

fn output_text(out: Vec<u8>) -> String {
    String::from_utf8_lossy(&out).into_owned()
}

fn shutdown_after(shutdown_tx: &ShutdownSender, delay: Duration) {
    let shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        drop(shutdown_tx.send(()));
    });
}

#[test]
fn bench_runs_all_three_benchmarks() -> AppResult<()> {
    run_async_test(async {
        let server = StubServer::start(default_routes()).await?;
        let probes = probes_for(&server.url)?;
        let Command::Bench(args) = parse_command(&[
            "streamprobe",
            "bench",
            "--requests",
            "3",
            "--pause",
            "1ms",
            "--clients",
            "2",
            "--per-client",
            "2",
            "--streams",
            "2",
        ])?
        else {
            return Err(AppError::validation("Expected bench command"));
        };
        let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let mut out = Vec::new();

        let results = tokio::time::timeout(
            RUN_TIMEOUT,
            run_bench(&probes, &args, &mut shutdown_rx, &mut out),
        )
        .await
        .map_err(|err| AppError::validation(format!("Bench timed out: {}", err)))??;

        let totals: Vec<u64> = results.iter().map(|result| result.total_requests).collect();
        if totals != vec![3, 4, 2] {
            return Err(AppError::validation(format!("Unexpected totals {:?}", totals)));
        }
        if results.iter().any(|result| result.failed_requests != 0) {
            return Err(AppError::validation("Expected every benchmark request to succeed"));
        }
        let text = output_text(out);
        for needle in [
            "Initial server metrics: {",
            "Final server metrics: {",
            "PERFORMANCE BENCHMARK RESULTS",
            "Streaming Performance:",
            "OVERALL PERFORMANCE:",
        ] {
            if !text.contains(needle) {
                return Err(AppError::validation(format!("Missing '{}' in:\n{}", needle, text)));
            }
        }
        Ok(())
    })
}

#[test]
fn bench_prints_empty_snapshot_when_metrics_fail() -> AppResult<()> {
    run_async_test(async {
        let routes: StubRoutes = Arc::new(|request: &StubRequest| {
            if request.path == "/metrics" {
                StubResponse::raw(500, "boom")
            } else {
                default_routes()(request)
            }
        });
        let server = StubServer::start(routes).await?;
        let probes = probes_for(&server.url)?;
        let Command::Bench(args) = parse_command(&[
            "streamprobe",
            "bench",
            "--requests",
            "1",
            "--clients",
            "1",
            "--per-client",
            "1",
            "--streams",
            "1",
        ])?
        else {
            return Err(AppError::validation("Expected bench command"));
        };
        let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let mut out = Vec::new();
        run_bench(&probes, &args, &mut shutdown_rx, &mut out).await?;

        let text = output_text(out);
        if !text.contains("Initial server metrics: {}") {
            return Err(AppError::validation(format!("Expected empty snapshot in:\n{}", text)));
        }
        Ok(())
    })
}

#[test]
fn suite_reports_every_test() -> AppResult<()> {
    run_async_test(async {
        let server = StubServer::start(default_routes()).await?;
        let probes = probes_for(&server.url)?;
        let Command::Suite(args) = parse_command(&[
            "streamprobe",
            "suite",
            "-c",
            "3",
            "--rate-requests",
            "2",
            "--rate-delay",
            "1ms",
        ])?
        else {
            return Err(AppError::validation("Expected suite command"));
        };
        let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let mut out = Vec::new();

        let sections = tokio::time::timeout(
            RUN_TIMEOUT,
            run_suite(&probes, &args, &mut shutdown_rx, &mut out),
        )
        .await
        .map_err(|err| AppError::validation(format!("Suite timed out: {}", err)))??;

        let names: Vec<&str> = sections.iter().map(|section| section.name.as_str()).collect();
        if names
            != vec![
                "Concurrent Streams",
                "Rate Limiting",
                "Large Responses",
                "Error Scenarios",
            ]
        {
            return Err(AppError::validation(format!("Unexpected sections {:?}", names)));
        }
        let Some(errors) = sections.last() else {
            return Err(AppError::validation("Missing error scenarios"));
        };
        if errors.outcomes.len() != 2 || errors.outcomes.iter().any(|outcome| !outcome.success) {
            return Err(AppError::validation(
                "Rejected invalid requests must count as passes",
            ));
        }
        let text = output_text(out);
        for needle in [
            "Concurrent Streams Results:",
            "Invalid model: PASS",
            "Overall Performance Summary:",
            "Performance Rating:",
        ] {
            if !text.contains(needle) {
                return Err(AppError::validation(format!("Missing '{}' in:\n{}", needle, text)));
            }
        }
        Ok(())
    })
}

#[test]
fn suite_flags_invalid_request_accepted_by_server() -> AppResult<()> {
    run_async_test(async {
        let routes: StubRoutes = Arc::new(|request: &StubRequest| {
            if request.path == "/v1/chat/completions" {
                StubResponse::stream(&["data: {\"choices\":[]}", "data: [DONE]"])
            } else {
                default_routes()(request)
            }
        });
        let server = StubServer::start(routes).await?;
        let probes = probes_for(&server.url)?;
        let Command::Suite(args) = parse_command(&[
            "streamprobe",
            "suite",
            "-c",
            "1",
            "--rate-requests",
            "1",
        ])?
        else {
            return Err(AppError::validation("Expected suite command"));
        };
        let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let mut out = Vec::new();
        let sections = run_suite(&probes, &args, &mut shutdown_rx, &mut out).await?;

        let Some(errors) = sections.last() else {
            return Err(AppError::validation("Missing error scenarios"));
        };
        if errors.outcomes.iter().any(|outcome| outcome.success) {
            return Err(AppError::validation("Accepted invalid requests must fail"));
        }
        if !output_text(out).contains("Invalid request: FAIL") {
            return Err(AppError::validation("Expected FAIL verdict in the report"));
        }
        Ok(())
    })
}

#[test]
fn probe_runs_every_stage() -> AppResult<()> {
    run_async_test(async {
        let server = StubServer::start(default_routes()).await?;
        let probes = probes_for(&server.url)?;
        let Command::Probe(args) =
            parse_command(&["streamprobe", "probe", "--reset-pause", "1ms"])?
        else {
            return Err(AppError::validation("Expected probe command"));
        };
        let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let mut out = Vec::new();

        let report = tokio::time::timeout(
            RUN_TIMEOUT,
            run_probe(&probes, &args, &mut shutdown_rx, &mut out),
        )
        .await
        .map_err(|err| AppError::validation(format!("Probe timed out: {}", err)))??;

        if report.interrupted || report.burst.len() != 3 || report.concurrent.len() != 5 {
            return Err(AppError::validation(format!(
                "Unexpected probe counts: burst {}, streams {}",
                report.burst.len(),
                report.concurrent.len()
            )));
        }
        if report.scenarios.iter().any(|(_, verdict)| !verdict.passed()) {
            return Err(AppError::validation("Expected every scenario to pass"));
        }
        let Some(integrity) = report.integrity.as_ref() else {
            return Err(AppError::validation("Expected the integrity check"));
        };
        if integrity.chunks_received != 3 || integrity.malformed_chunks != 0 {
            return Err(AppError::validation("Unexpected integrity counts"));
        }
        let text = output_text(out);
        for needle in [
            "Successful requests: 3",
            "Successful streams: 5",
            "Server is healthy and responsive (OK 1.2.3)",
            "SUCCESS: no JSON parsing errors",
            "Content sample: Hello there...",
        ] {
            if !text.contains(needle) {
                return Err(AppError::validation(format!("Missing '{}' in:\n{}", needle, text)));
            }
        }
        Ok(())
    })
}

#[test]
fn probe_skips_integrity_when_disabled() -> AppResult<()> {
    run_async_test(async {
        let server = StubServer::start(default_routes()).await?;
        let probes = probes_for(&server.url)?;
        let Command::Probe(args) = parse_command(&[
            "streamprobe",
            "probe",
            "--reset-pause",
            "1ms",
            "--burst",
            "1",
            "--streams",
            "1",
            "--no-integrity",
        ])?
        else {
            return Err(AppError::validation("Expected probe command"));
        };
        let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let mut out = Vec::new();
        let report = run_probe(&probes, &args, &mut shutdown_rx, &mut out).await?;
        if report.integrity.is_some() {
            return Err(AppError::validation("Integrity check should be skipped"));
        }
        if output_text(out).contains("Stream Integrity:") {
            return Err(AppError::validation("Integrity section should be absent"));
        }
        Ok(())
    })
}

#[test]
fn probe_stops_on_shutdown() -> AppResult<()> {
    run_async_test(async {
        let routes: StubRoutes = Arc::new(|request: &StubRequest| {
            if request.path == "/v1/chat/completions" {
                StubResponse::Hang
            } else {
                default_routes()(request)
            }
        });
        let server = StubServer::start(routes).await?;
        let probes = probes_for(&server.url)?;
        let Command::Probe(args) = parse_command(&["streamprobe", "probe"])? else {
            return Err(AppError::validation("Expected probe command"));
        };
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        shutdown_after(&shutdown_tx, Duration::from_millis(100));
        let mut out = Vec::new();

        let report = tokio::time::timeout(
            RUN_TIMEOUT,
            run_probe(&probes, &args, &mut shutdown_rx, &mut out),
        )
        .await
        .map_err(|err| AppError::validation(format!("Probe ignored shutdown: {}", err)))??;
        if !report.interrupted || !report.concurrent.is_empty() {
            return Err(AppError::validation("Expected the probe to stop after the burst"));
        }
        Ok(())
    })
}

#[test]
fn monitor_writes_history_on_shutdown() -> AppResult<()> {
    run_async_test(async {
        let server = StubServer::start(default_routes()).await?;
        let probes = probes_for(&server.url)?;
        let dir = tempdir()?;
        let log_dir = dir.path().to_string_lossy().into_owned();
        let Command::Monitor(args) = parse_command(&[
            "streamprobe",
            "monitor",
            "--plain",
            "--interval",
            "20ms",
            "--log-dir",
            log_dir.as_str(),
        ])?
        else {
            return Err(AppError::validation("Expected monitor command"));
        };
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        shutdown_after(&shutdown_tx, Duration::from_millis(150));
        let mut renderer = PlainRenderer::new(Vec::new());

        let path = tokio::time::timeout(
            RUN_TIMEOUT,
            run_monitor(probes.source, &args, &mut renderer, &mut shutdown_rx),
        )
        .await
        .map_err(|err| AppError::validation(format!("Monitor timed out: {}", err)))??;

        let Some(path) = path else {
            return Err(AppError::validation("Expected a performance log"));
        };
        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        let entries = written.as_array().map_or(0, Vec::len);
        if entries == 0 {
            return Err(AppError::validation("Expected recorded snapshots"));
        }
        if !output_text(renderer.into_inner()).contains("API SERVER PERFORMANCE MONITOR") {
            return Err(AppError::validation("Expected monitor frames"));
        }
        Ok(())
    })
}

#[test]
fn monitor_skips_log_without_snapshots() -> AppResult<()> {
    run_async_test(async {
        let probes = probes_for("http://127.0.0.1:1")?;
        let dir = tempdir()?;
        let log_dir = dir.path().to_string_lossy().into_owned();
        let Command::Monitor(args) = parse_command(&[
            "streamprobe",
            "monitor",
            "--plain",
            "--interval",
            "20ms",
            "--log-dir",
            log_dir.as_str(),
        ])?
        else {
            return Err(AppError::validation("Expected monitor command"));
        };
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        shutdown_after(&shutdown_tx, Duration::from_millis(100));
        let mut renderer = PlainRenderer::new(Vec::new());

        let path = run_monitor(probes.source, &args, &mut renderer, &mut shutdown_rx).await?;
        if path.is_some() {
            return Err(AppError::validation("No log expected without snapshots"));
        }
        if std::fs::read_dir(dir.path())?.next().is_some() {
            return Err(AppError::validation("Log directory should stay empty"));
        }
        Ok(())
    })
}

#[test]
fn dashboard_renders_until_shutdown() -> AppResult<()> {
    run_async_test(async {
        let server = StubServer::start(default_routes()).await?;
        let probes = probes_for(&server.url)?;
        let Command::Dashboard(args) =
            parse_command(&["streamprobe", "dashboard", "--plain", "--interval", "20ms"])?
        else {
            return Err(AppError::validation("Expected dashboard command"));
        };
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        shutdown_after(&shutdown_tx, Duration::from_millis(100));
        let mut renderer = PlainRenderer::new(Vec::new());

        let cycles = tokio::time::timeout(
            RUN_TIMEOUT,
            run_dashboard(probes.source, &args, &mut renderer, &mut shutdown_rx),
        )
        .await
        .map_err(|err| AppError::validation(format!("Dashboard timed out: {}", err)))??;
        if cycles == 0 {
            return Err(AppError::validation("Expected at least one refresh"));
        }
        let text = output_text(renderer.into_inner());
        if !text.contains("API SERVER MONITORING DASHBOARD") || !text.contains("Status: OK") {
            return Err(AppError::validation(format!("Unexpected frames:\n{}", text)));
        }
        Ok(())
    })
}
