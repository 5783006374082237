use std::fmt;

use super::snapshot::MetricsSnapshot;

/// Direction of a counter between two consecutive snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Initial,
    Up(u64),
    Down(u64),
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "→ initial"),
            Self::Up(delta) => write!(f, "↗ +{}", delta),
            Self::Down(delta) => write!(f, "↘ -{}", delta),
            Self::Stable => write!(f, "→ stable"),
        }
    }
}

#[must_use]
pub const fn counter_trend(current: u64, previous: Option<u64>) -> Trend {
    match previous {
        None => Trend::Initial,
        Some(previous) if current > previous => Trend::Up(current.saturating_sub(previous)),
        Some(previous) if current < previous => Trend::Down(previous.saturating_sub(current)),
        Some(_) => Trend::Stable,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendDeltas {
    pub active_streams: Trend,
    pub total_requests: Trend,
    pub failed_streams: Trend,
}

/// Trends of `current` against the previously rendered snapshot.
#[must_use]
pub fn compute_trend(current: &MetricsSnapshot, previous: Option<&MetricsSnapshot>) -> TrendDeltas {
    TrendDeltas {
        active_streams: counter_trend(
            current.streams.active,
            previous.map(|snapshot| snapshot.streams.active),
        ),
        total_requests: counter_trend(
            current.streams.total,
            previous.map(|snapshot| snapshot.streams.total),
        ),
        failed_streams: counter_trend(
            current.streams.failed,
            previous.map(|snapshot| snapshot.streams.failed),
        ),
    }
}
