//! Launcher error types.

use dg_core::PayloadError;
use thiserror::Error;

/// Errors starting an integrator session.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The HTTP request could not be sent or its response not read.
    #[error("integrator request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The integrator answered with an unexpected status.
    #[error("integrator rejected session (HTTP {status}): {body}")]
    Rejected {
        /// Response status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },
    /// An AWS call failed or reported failures.
    #[error("AWS call failed: {0}")]
    Aws(String),
    /// The payload could not be encoded.
    #[error(transparent)]
    Serialize(#[from] PayloadError),
}

/// Result type for launcher operations.
pub type Result<T> = std::result::Result<T, LaunchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_display() {
        let err = LaunchError::Rejected {
            status: 503,
            body: "busy".into(),
        };
        assert_eq!(err.to_string(), "integrator rejected session (HTTP 503): busy");
    }

    #[test]
    fn aws_display() {
        let err = LaunchError::Aws("RunTask reported 1 failure(s): RESOURCE:MEMORY".into());
        assert!(err.to_string().starts_with("AWS call failed: RunTask"));
    }
}
