use thiserror::Error;

/// Why a single request did not succeed.
///
/// This is recorded on the owning `Outcome` rather than propagated, so one
/// failed request never aborts a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutcomeError {
    /// Connection refused, reset, or timed out before a complete response.
    #[error("{message}")]
    Transport { message: String, timed_out: bool },
    /// Non-2xx status with a parseable error body.
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },
    /// Non-2xx status whose body carried no readable error.
    #[error("HTTP {status}")]
    ServerOpaque { status: u16 },
    /// 200 response whose body was not a completion object.
    #[error("Invalid completion body: {message}")]
    InvalidBody { message: String },
    /// A deliberately invalid request was accepted without any error marker.
    #[error("Expected a rejection, got clean HTTP {status}")]
    ExpectedFailureMismatch { status: u16 },
}

impl OutcomeError {
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, OutcomeError::Transport { .. })
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, OutcomeError::Transport { timed_out: true, .. })
    }
}
