use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::snapshot::{ConnectionPoolStats, MetricsSnapshot};

/// Snapshots averaged for the monitor's trend view.
pub const DEFAULT_TREND_WINDOW: usize = 10;
/// Oldest entries are evicted beyond this many recorded snapshots.
pub const DEFAULT_HISTORY_MAX: usize = 10_000;

/// A snapshot as stored in the monitor history and written to the log dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedSnapshot {
    /// RFC 3339 local time of the poll.
    pub timestamp: String,
    pub monitor_uptime_hours: f64,
    #[serde(flatten)]
    pub snapshot: MetricsSnapshot,
}

/// Bounded, append-only record of monitor polls.
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    entries: VecDeque<RecordedSnapshot>,
    max_entries: usize,
}

impl SnapshotHistory {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn push(&mut self, entry: RecordedSnapshot) {
        while self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to `window` most recent entries, oldest first.
    #[must_use]
    pub fn recent(&self, window: usize) -> Vec<&RecordedSnapshot> {
        let skip = self.entries.len().saturating_sub(window);
        self.entries.iter().skip(skip).collect()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<&RecordedSnapshot> {
        self.entries.iter().collect()
    }
}

/// Averages over the recent window plus the newest point-in-time values.
///
/// The success rate is derived from the newest stream counters rather than
/// the server's own `successRate` figure.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceTrends {
    pub avg_response_time_ms: f64,
    pub avg_throughput_chunks_per_sec: f64,
    pub avg_memory_mb: f64,
    pub success_rate: f64,
    pub total_requests: u64,
    pub active_streams: u64,
    pub connection_pool: ConnectionPoolStats,
}

/// `None` until at least two snapshots are available.
#[must_use]
pub fn compute_window_trends(recent: &[&RecordedSnapshot]) -> Option<PerformanceTrends> {
    if recent.len() < 2 {
        return None;
    }
    let latest = &recent.last()?.snapshot;
    let count = recent.len() as f64;
    let average = |value: fn(&MetricsSnapshot) -> f64| -> f64 {
        recent.iter().map(|entry| value(&entry.snapshot)).sum::<f64>() / count
    };

    Some(PerformanceTrends {
        avg_response_time_ms: average(|snapshot| snapshot.performance.average_stream_duration),
        avg_throughput_chunks_per_sec: average(|snapshot| snapshot.performance.chunks_per_second),
        avg_memory_mb: average(|snapshot| snapshot.memory.heap_used_mb()),
        success_rate: if latest.streams.total > 0 {
            latest.streams.successful as f64 / latest.streams.total as f64 * 100.0
        } else {
            0.0
        },
        total_requests: latest.streams.total,
        active_streams: latest.streams.active,
        connection_pool: latest.connection_pool.clone(),
    })
}
