use std::fmt;

use crate::error::OutcomeError;
use crate::metrics::Outcome;

const TOO_MANY_REQUESTS: u16 = 429;
const OK: u16 = 200;

/// Rate-limit probes are tallied in three classes; 429 is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitClass {
    Succeeded,
    RateLimited,
    Failed,
}

#[must_use]
pub const fn classify_rate_limit(outcome: &Outcome) -> RateLimitClass {
    if outcome.success {
        RateLimitClass::Succeeded
    } else if outcome.status == TOO_MANY_REQUESTS {
        RateLimitClass::RateLimited
    } else {
        RateLimitClass::Failed
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitTally {
    pub succeeded: u64,
    pub rate_limited: u64,
    pub failed: u64,
}

impl RateLimitTally {
    #[must_use]
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |mut tally, outcome| {
                match classify_rate_limit(outcome) {
                    RateLimitClass::Succeeded => tally.succeeded = tally.succeeded.saturating_add(1),
                    RateLimitClass::RateLimited => {
                        tally.rate_limited = tally.rate_limited.saturating_add(1);
                    }
                    RateLimitClass::Failed => tally.failed = tally.failed.saturating_add(1),
                }
                tally
            })
    }
}

/// Result of a deliberately invalid request; success means the server refused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioVerdict {
    /// Non-200 status or an error marker in a 200 body.
    Rejected { status: u16 },
    /// The server could not be reached; counted as a pass.
    Unreachable { message: String },
    /// A clean 200 where a rejection was required.
    ExpectedFailureMismatch { status: u16 },
}

impl ScenarioVerdict {
    #[must_use]
    pub const fn passed(&self) -> bool {
        !matches!(self, Self::ExpectedFailureMismatch { .. })
    }
}

impl fmt::Display for ScenarioVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { status } => write!(f, "rejected with HTTP {}", status),
            Self::Unreachable { message } => write!(f, "no response ({})", message),
            Self::ExpectedFailureMismatch { status } => {
                write!(f, "expected a rejection, got clean HTTP {}", status)
            }
        }
    }
}

#[must_use]
pub fn classify_error_scenario(outcome: &Outcome) -> ScenarioVerdict {
    if outcome.status == 0 {
        return ScenarioVerdict::Unreachable {
            message: outcome.error_message().unwrap_or_default(),
        };
    }
    if outcome.status != OK || outcome.error_indicator {
        ScenarioVerdict::Rejected {
            status: outcome.status,
        }
    } else {
        ScenarioVerdict::ExpectedFailureMismatch {
            status: outcome.status,
        }
    }
}

/// Re-scores an error-scenario outcome by its verdict.
///
/// The returned outcome counts as successful when the scenario passed, and
/// carries [`OutcomeError::ExpectedFailureMismatch`] when it did not.
#[must_use]
pub fn into_scenario_outcome(mut outcome: Outcome) -> (Outcome, ScenarioVerdict) {
    let verdict = classify_error_scenario(&outcome);
    outcome.success = verdict.passed();
    outcome.error = match &verdict {
        ScenarioVerdict::ExpectedFailureMismatch { status } => {
            Some(OutcomeError::ExpectedFailureMismatch { status: *status })
        }
        ScenarioVerdict::Rejected { .. } | ScenarioVerdict::Unreachable { .. } => None,
    };
    (outcome, verdict)
}
