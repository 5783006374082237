use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Local;
use tracing::{debug, warn};

use crate::http::MetricsSource;
use crate::metrics::{
    BYTES_PER_MB, MONITOR_RATING, MetricsSnapshot, PerformanceTrends, RatingInput,
    RecordedSnapshot, SnapshotHistory, classify_rating, compute_window_trends,
};
use crate::ui::{Screen, Section, Tone};

use super::format::{format_interval, rating_tone};
use super::poll::LiveState;

const TITLE: &str = "API SERVER PERFORMANCE MONITOR";
const SECS_PER_HOUR: f64 = 3600.0;

/// Log-mode monitor: keeps every poll and rates the recent window.
pub struct MonitorState<S: MetricsSource + ?Sized> {
    source: Arc<S>,
    interval: Duration,
    window: usize,
    started: Instant,
    history: SnapshotHistory,
}

impl<S: MetricsSource + ?Sized> MonitorState<S> {
    #[must_use]
    pub fn new(source: Arc<S>, interval: Duration, history_max: usize, window: usize) -> Self {
        Self {
            source,
            interval,
            window: window.max(1),
            started: Instant::now(),
            history: SnapshotHistory::new(history_max),
        }
    }

    #[must_use]
    pub const fn history(&self) -> &SnapshotHistory {
        &self.history
    }
}

#[async_trait]
impl<S: MetricsSource + ?Sized> LiveState for MonitorState<S> {
    async fn refresh(&mut self) -> Screen {
        let now = Local::now();
        let clock = now.format("%H:%M:%S").to_string();
        match self.source.fetch_snapshot().await {
            Ok(snapshot) => {
                self.history.push(RecordedSnapshot {
                    timestamp: now.to_rfc3339(),
                    monitor_uptime_hours: self.started.elapsed().as_secs_f64() / SECS_PER_HOUR,
                    snapshot: snapshot.clone(),
                });
                debug!("Recorded snapshot {}", self.history.len());
                let trends = compute_window_trends(&self.history.recent(self.window));
                monitor_screen(
                    self.source.target(),
                    &clock,
                    &snapshot,
                    trends.as_ref(),
                    self.history.len(),
                    self.interval,
                )
            }
            Err(err) => {
                warn!("Failed to collect metrics: {}", err);
                Screen::new(TITLE)
                    .subtitle(format!("Time: {} | Server: {}", clock, self.source.target()))
                    .section(
                        Section::new("Status")
                            .toned("Unable to collect metrics - is the server running?", Tone::Bad)
                            .toned(format!("Cause: {}", err), Tone::Muted),
                    )
                    .footer(footer(self.history.len(), self.interval))
            }
        }
    }
}

fn footer(recorded: usize, interval: Duration) -> String {
    format!(
        "Press Ctrl+C to stop monitoring | {} snapshots recorded | every {}",
        recorded,
        format_interval(interval)
    )
}

/// Rated view of the newest snapshot and the recent window.
///
/// Until two snapshots exist there are no window averages and no rating.
#[must_use]
pub fn monitor_screen(
    target: &str,
    clock: &str,
    snapshot: &MetricsSnapshot,
    trends: Option<&PerformanceTrends>,
    recorded: usize,
    interval: Duration,
) -> Screen {
    let streams = &snapshot.streams;
    let memory = &snapshot.memory;

    let mut screen = Screen::new(TITLE).subtitle(format!(
        "Time: {} | Uptime: {} | Server: {}",
        clock,
        if snapshot.uptime.human.is_empty() {
            "Unknown"
        } else {
            snapshot.uptime.human.as_str()
        },
        target
    ));

    let mut status = Section::new("Current Status").line(format!(
        "Active Streams:    {}/{}",
        streams.active, streams.max_concurrent
    ));
    let mut performance = Section::new("Performance");
    let mut resources = Section::new("Resources").line(format!(
        "Memory Usage:      {:.1}MB / {:.1}MB",
        memory.heap_used_mb(),
        memory.heap_total as f64 / BYTES_PER_MB
    ));

    match trends {
        Some(window) => {
            status = status
                .line(format!("Success Rate:      {:.1}%", window.success_rate))
                .line(format!("Total Requests:    {}", window.total_requests));
            performance = performance
                .line(format!("Avg Response:      {:.0}ms", window.avg_response_time_ms))
                .line(format!(
                    "Throughput:        {:.1} chunks/sec",
                    window.avg_throughput_chunks_per_sec
                ));
            resources = resources.line(format!("Memory Trend:      {:.1}MB avg", window.avg_memory_mb));
        }
        None => {
            status = status
                .line(format!("Total Requests:    {}", streams.total))
                .toned("Collecting a second sample for trends", Tone::Muted);
        }
    }
    performance = performance.line(format!(
        "Bytes/sec:         {:.0}",
        snapshot.performance.bytes_per_second
    ));

    let pool = &snapshot.connection_pool;
    let connection_pool = Section::new("Connection Pool")
        .line(format!("Active Connections: {}", pool.active_connections))
        .line(format!("Pending Requests:   {}", pool.pending_requests))
        .line(format!("Total Requests:     {}", pool.total_requests))
        .line(format!("Error Rate:         {} errors", pool.total_errors))
        .line(format!("Avg Response:       {:.1}ms", pool.average_response_time));

    screen = screen
        .section(status)
        .section(performance)
        .section(resources)
        .section(connection_pool);

    if let Some(window) = trends {
        let tier = classify_rating(
            MONITOR_RATING,
            &RatingInput {
                response_time_ms: window.avg_response_time_ms,
                success_rate: window.success_rate,
                memory_mb: Some(window.avg_memory_mb),
                requests_per_second: None,
            },
        );
        screen = screen.section(
            Section::new("Rating").toned(format!("PERFORMANCE RATING: {}", tier), rating_tone(tier)),
        );
    }
    screen.footer(footer(recorded, interval))
}
