//! Domain errors for the commit gate.

use std::time::Duration;

use thiserror::Error;

use super::models::SourceKind;

/// Fatal errors that abort a gate run.
///
/// A pending check is never represented here: it is a normal
/// not-yet-converged round, not an error.
#[derive(Debug, Error)]
pub enum GateError {
    /// Invalid or missing input; raised before polling starts.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source could not be read: network, non-2xx or undecodable body.
    #[error("Failed to fetch {kind}: {message}")]
    Fetch {
        /// Source that failed.
        kind: SourceKind,
        /// Underlying cause.
        message: String,
    },

    /// A round limit or deadline was reached first.
    #[error("Checks did not converge after {rounds} round(s) in {:.1}s", .elapsed.as_secs_f64())]
    Timeout {
        /// Rounds completed or started.
        rounds: u32,
        /// Time since the first fetch.
        elapsed: Duration,
    },
}

impl GateError {
    /// Build a fetch error for the given source.
    pub fn fetch(kind: SourceKind, message: impl Into<String>) -> Self {
        Self::Fetch {
            kind,
            message: message.into(),
        }
    }

    /// Process exit code the reporter uses for this error kind.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Fetch { .. } => 1,
            Self::Config(_) => 2,
            Self::Timeout { .. } => 3,
        }
    }
}

/// Result alias for gate operations.
pub type GateResult<T> = Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_message_names_source() {
        let err = GateError::fetch(SourceKind::CheckRun, "connection refused");
        assert_eq!(
            err.to_string(),
            "Failed to fetch check-runs: connection refused"
        );
    }

    #[test]
    fn test_timeout_message() {
        let err = GateError::Timeout {
            rounds: 4,
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(
            err.to_string(),
            "Checks did not converge after 4 round(s) in 1.5s"
        );
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            GateError::fetch(SourceKind::Status, "x").exit_code(),
            GateError::Config("x".to_string()).exit_code(),
            GateError::Timeout {
                rounds: 1,
                elapsed: Duration::ZERO,
            }
            .exit_code(),
        ];
        assert_eq!(codes, [1, 2, 3]);
    }
}
