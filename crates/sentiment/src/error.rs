use {std::time::Duration, thiserror::Error};

use crate::outcome::FallbackReason;

/// Which half of the submit/fetch protocol a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Submit,
    Fetch,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Submit => "submit",
            Self::Fetch => "fetch",
        })
    }
}

/// Failure of the remote round trip. Always absorbed by the resolver.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("submit reply carried no event id (HTTP {status})")]
    SubmissionFailed { status: u16 },

    #[error("remote inference timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),

    #[error("{phase} request failed: {message}")]
    Transport { phase: Phase, message: String },
}

impl RemoteError {
    #[must_use]
    pub fn transport(phase: Phase, message: impl Into<String>) -> Self {
        Self::Transport {
            phase,
            message: message.into(),
        }
    }

    /// Stable identifier used as a metrics label.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SubmissionFailed { .. } => "submission_failed",
            Self::TimedOut(_) => "timed_out",
            Self::Transport { .. } => "transport",
        }
    }

    #[must_use]
    pub fn fallback_reason(&self) -> FallbackReason {
        match self {
            Self::SubmissionFailed { .. } => FallbackReason::SubmissionFailed,
            Self::TimedOut(_) => FallbackReason::TimedOut,
            Self::Transport { .. } => FallbackReason::Transport,
        }
    }
}
