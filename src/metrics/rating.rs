use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RatingTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl RatingTier {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "EXCELLENT",
            Self::Good => "GOOD",
            Self::Fair => "FAIR",
            Self::Poor => "POOR",
        }
    }
}

impl fmt::Display for RatingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Observed values a rating is judged on. Unknown figures are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingInput {
    pub response_time_ms: f64,
    pub success_rate: f64,
    pub memory_mb: Option<f64>,
    pub requests_per_second: Option<f64>,
}

/// One tier of a rating table; every present threshold must hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingRow {
    pub tier: RatingTier,
    pub max_response_time_ms: Option<f64>,
    pub min_success_rate: Option<f64>,
    pub max_memory_mb: Option<f64>,
    pub min_requests_per_second: Option<f64>,
}

impl RatingRow {
    const fn new(tier: RatingTier) -> Self {
        Self {
            tier,
            max_response_time_ms: None,
            min_success_rate: None,
            max_memory_mb: None,
            min_requests_per_second: None,
        }
    }

    const fn response_below(mut self, ms: f64) -> Self {
        self.max_response_time_ms = Some(ms);
        self
    }

    const fn success_at_least(mut self, rate: f64) -> Self {
        self.min_success_rate = Some(rate);
        self
    }

    const fn memory_below(mut self, mb: f64) -> Self {
        self.max_memory_mb = Some(mb);
        self
    }

    const fn rps_at_least(mut self, rps: f64) -> Self {
        self.min_requests_per_second = Some(rps);
        self
    }

    fn accepts(&self, observed: &RatingInput) -> bool {
        let response_ok = self
            .max_response_time_ms
            .is_none_or(|max| observed.response_time_ms < max);
        let success_ok = self
            .min_success_rate
            .is_none_or(|min| observed.success_rate >= min);
        let memory_ok = self
            .max_memory_mb
            .is_none_or(|max| observed.memory_mb.is_some_and(|mb| mb < max));
        let rps_ok = self
            .min_requests_per_second
            .is_none_or(|min| observed.requests_per_second.is_some_and(|rps| rps >= min));
        response_ok && success_ok && memory_ok && rps_ok
    }
}

pub const MONITOR_RATING: &[RatingRow] = &[
    RatingRow::new(RatingTier::Excellent)
        .response_below(1000.0)
        .success_at_least(95.0)
        .memory_below(500.0),
    RatingRow::new(RatingTier::Good)
        .response_below(2000.0)
        .success_at_least(90.0)
        .memory_below(750.0),
    RatingRow::new(RatingTier::Fair)
        .response_below(5000.0)
        .success_at_least(80.0),
];

pub const BENCHMARK_RATING: &[RatingRow] = &[
    RatingRow::new(RatingTier::Excellent)
        .rps_at_least(50.0)
        .response_below(1000.0)
        .success_at_least(95.0),
    RatingRow::new(RatingTier::Good)
        .rps_at_least(25.0)
        .response_below(2000.0)
        .success_at_least(90.0),
];

pub const SUITE_RATING: &[RatingRow] = &[
    RatingRow::new(RatingTier::Excellent)
        .success_at_least(95.0)
        .response_below(3000.0),
    RatingRow::new(RatingTier::Good)
        .success_at_least(90.0)
        .response_below(5000.0),
];

/// First row whose thresholds all hold, otherwise [`RatingTier::Poor`].
#[must_use]
pub fn classify_rating(table: &[RatingRow], observed: &RatingInput) -> RatingTier {
    table
        .iter()
        .find(|row| row.accepts(observed))
        .map_or(RatingTier::Poor, |row| row.tier)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorLevel {
    Good,
    Warn,
    Bad,
}

/// Dashboard status word with its severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicator {
    pub label: &'static str,
    pub level: IndicatorLevel,
}

const fn indicator(label: &'static str, level: IndicatorLevel) -> Indicator {
    Indicator { label, level }
}

/// Stream capacity in percent of `max_concurrent` and its status.
#[must_use]
pub fn capacity_indicator(active: u64, max_concurrent: u64) -> (f64, Indicator) {
    let percent = if max_concurrent > 0 {
        active as f64 / max_concurrent as f64 * 100.0
    } else {
        0.0
    };
    let status = if percent < 50.0 {
        indicator("LOW", IndicatorLevel::Good)
    } else if percent < 80.0 {
        indicator("MEDIUM", IndicatorLevel::Warn)
    } else {
        indicator("HIGH", IndicatorLevel::Bad)
    };
    (percent, status)
}

#[must_use]
pub fn success_indicator(success_rate: f64) -> Indicator {
    if success_rate >= 95.0 {
        indicator("EXCELLENT", IndicatorLevel::Good)
    } else if success_rate >= 90.0 {
        indicator("GOOD", IndicatorLevel::Warn)
    } else {
        indicator("POOR", IndicatorLevel::Bad)
    }
}

#[must_use]
pub fn memory_indicator(heap_used_mb: f64) -> Indicator {
    if heap_used_mb < 500.0 {
        indicator("NORMAL", IndicatorLevel::Good)
    } else if heap_used_mb < 1000.0 {
        indicator("ELEVATED", IndicatorLevel::Warn)
    } else {
        indicator("HIGH", IndicatorLevel::Bad)
    }
}
