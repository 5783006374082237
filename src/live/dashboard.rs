use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use tracing::warn;

use crate::error::HttpError;
use crate::http::MetricsSource;
use crate::metrics::{
    HealthStatus, MetricsSnapshot, TrendDeltas, capacity_indicator, compute_trend,
    memory_indicator, success_indicator,
};
use crate::ui::{Screen, Section, Tone};

use super::format::{format_bytes, format_interval, format_number, indicator_tone};
use super::poll::LiveState;

const TITLE: &str = "API SERVER MONITORING DASHBOARD";

/// Live dashboard holding the last successfully rendered snapshot.
pub struct DashboardState<S: MetricsSource + ?Sized> {
    source: Arc<S>,
    interval: Duration,
    previous: Option<MetricsSnapshot>,
}

impl<S: MetricsSource + ?Sized> DashboardState<S> {
    #[must_use]
    pub const fn new(source: Arc<S>, interval: Duration) -> Self {
        Self {
            source,
            interval,
            previous: None,
        }
    }

    #[must_use]
    pub const fn previous(&self) -> Option<&MetricsSnapshot> {
        self.previous.as_ref()
    }
}

#[async_trait]
impl<S: MetricsSource + ?Sized> LiveState for DashboardState<S> {
    async fn refresh(&mut self) -> Screen {
        let (metrics, health) =
            tokio::join!(self.source.fetch_snapshot(), self.source.fetch_health());
        let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let health = health.ok();

        match metrics {
            Ok(snapshot) => {
                let trends = compute_trend(&snapshot, self.previous.as_ref());
                let screen = dashboard_screen(
                    self.source.target(),
                    &now,
                    health.as_ref(),
                    &snapshot,
                    &trends,
                    self.interval,
                );
                self.previous = Some(snapshot);
                screen
            }
            Err(err) => {
                warn!("Failed to fetch metrics from {}: {}", self.source.target(), err);
                unreachable_screen(self.source.target(), &now, health.as_ref(), &err, self.interval)
            }
        }
    }
}

fn header(target: &str, now: &str) -> Screen {
    Screen::new(TITLE).subtitle(format!("{} | Server: {}", now, target))
}

fn footer(interval: Duration) -> String {
    format!(
        "Press Ctrl+C to exit | Refreshing every {}",
        format_interval(interval)
    )
}

fn health_section(health: Option<&HealthStatus>) -> Section {
    let section = Section::new("Server Health");
    match health {
        Some(status) => section
            .toned(format!("Status: {}", status.status.to_uppercase()), Tone::Good)
            .line(format!("Service: {}", or_unknown(&status.message)))
            .line(format!("Version: {}", or_unknown(&status.version))),
        None => section.toned("Status: UNREACHABLE", Tone::Bad),
    }
}

const fn or_unknown(value: &str) -> &str {
    if value.is_empty() { "Unknown" } else { value }
}

/// Full dashboard for one successful poll.
#[must_use]
pub fn dashboard_screen(
    target: &str,
    now: &str,
    health: Option<&HealthStatus>,
    snapshot: &MetricsSnapshot,
    trends: &TrendDeltas,
    interval: Duration,
) -> Screen {
    let streams = &snapshot.streams;
    let performance = &snapshot.performance;
    let memory = &snapshot.memory;

    let uptime = Section::new("Uptime")
        .line(format!("Duration: {}", or_unknown(&snapshot.uptime.human)))
        .line(format!("Hours: {:.1}h", snapshot.uptime.hours));

    let streaming = Section::new("Streaming Statistics")
        .line(format!(
            "Active Streams: {}/{} {}",
            streams.active, streams.max_concurrent, trends.active_streams
        ))
        .line(format!("Peak Concurrent: {}", streams.peak_concurrent))
        .line(format!(
            "Total Requests: {} {}",
            format_number(streams.total),
            trends.total_requests
        ))
        .line(format!("Successful: {}", format_number(streams.successful)))
        .line(format!(
            "Failed: {} {}",
            format_number(streams.failed),
            trends.failed_streams
        ))
        .line(format!("Success Rate: {:.1}%", streams.success_rate));

    let perf = Section::new("Performance Metrics")
        .line(format!("Total Chunks: {}", format_number(performance.total_chunks)))
        .line(format!(
            "Total Data: {}",
            format_bytes(performance.total_bytes as f64)
        ))
        .line(format!(
            "Avg Stream Duration: {:.0}ms",
            performance.average_stream_duration
        ))
        .line(format!("Chunks/sec: {:.1}", performance.chunks_per_second))
        .line(format!(
            "Throughput: {}/s",
            format_bytes(performance.bytes_per_second)
        ));

    let mut mem = Section::new("Memory Usage")
        .line(format!("Heap Used: {}", format_bytes(memory.heap_used as f64)))
        .line(format!("Heap Total: {}", format_bytes(memory.heap_total as f64)))
        .line(format!("RSS: {}", format_bytes(memory.rss as f64)))
        .line(format!("External: {}", format_bytes(memory.external as f64)));
    if let Some(percent) = memory.heap_usage_percent() {
        mem = mem.line(format!("Usage: {:.1}%", percent));
    }

    let rate_limiting = Section::new("Rate Limiting")
        .line(format!(
            "Active Clients: {}",
            snapshot.rate_limiting.active_clients
        ))
        .line(format!("Interval: {}ms", snapshot.rate_limiting.interval_ms));

    let (capacity_percent, capacity) =
        capacity_indicator(streams.active, streams.max_concurrent);
    let success = success_indicator(streams.success_rate);
    let heap_mb = memory.heap_used_mb();
    let heap = memory_indicator(heap_mb);
    let indicators = Section::new("Status Indicators")
        .toned(
            format!("Stream Capacity: {} ({:.1}%)", capacity.label, capacity_percent),
            indicator_tone(capacity.level),
        )
        .toned(
            format!("Success Rate: {} ({:.1}%)", success.label, streams.success_rate),
            indicator_tone(success.level),
        )
        .toned(
            format!("Memory Status: {} ({:.0}MB)", heap.label, heap_mb),
            indicator_tone(heap.level),
        );

    header(target, now)
        .section(health_section(health))
        .section(uptime)
        .section(streaming)
        .section(perf)
        .section(mem)
        .section(rate_limiting)
        .section(indicators)
        .footer(footer(interval))
}

/// View shown while `/metrics` cannot be fetched; trends are left untouched.
#[must_use]
pub fn unreachable_screen(
    target: &str,
    now: &str,
    health: Option<&HealthStatus>,
    err: &HttpError,
    interval: Duration,
) -> Screen {
    let metrics = Section::new("Metrics")
        .toned("Unable to fetch metrics from server", Tone::Bad)
        .line(format!("Server URL: {}", target))
        .toned(format!("Cause: {}", err), Tone::Muted)
        .line(format!("Retrying in {}...", format_interval(interval)));
    header(target, now)
        .section(health_section(health))
        .section(metrics)
        .footer(footer(interval))
}
