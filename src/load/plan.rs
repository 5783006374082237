use std::num::NonZeroUsize;
use std::time::Duration;

use crate::http::PlannedRequest;

/// Delays applied by a sequential schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pacing {
    /// Sleep between consecutive requests.
    pub delay_between: Duration,
    /// Extra pause after every request whose index is a multiple of the count.
    pub pause_every: Option<(NonZeroUsize, Duration)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// All requests in flight at once.
    FanOut,
    /// At most `max_in_flight` requests in flight.
    Bounded { max_in_flight: NonZeroUsize },
    /// Consecutive runs of `per_client` requests, one concurrent client each.
    Clients { per_client: NonZeroUsize },
    /// One request at a time.
    Sequential(Pacing),
}

#[derive(Debug, Clone)]
pub struct LoadPlan {
    pub name: String,
    pub requests: Vec<PlannedRequest>,
    pub schedule: Schedule,
}

impl LoadPlan {
    #[must_use]
    pub fn new<S: Into<String>>(name: S, requests: Vec<PlannedRequest>, schedule: Schedule) -> Self {
        Self {
            name: name.into(),
            requests,
            schedule,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.requests.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Upper bound on requests in flight at once.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        match self.schedule {
            Schedule::FanOut => self.requests.len(),
            Schedule::Bounded { max_in_flight } => max_in_flight.get().min(self.requests.len()),
            Schedule::Clients { per_client } => self.requests.len().div_ceil(per_client.get()),
            Schedule::Sequential(_) => self.requests.len().min(1),
        }
    }
}
