//! Domain errors for the suggestion engine.

use thiserror::Error;

/// Status reported for failures that never produced an upstream response.
pub const INTERNAL_FAILURE_STATUS: u16 = 500;

/// Errors raised by the suggestion pipeline and its collaborators.
///
/// None of these ever reach the editing flow as hard errors: the fetch path
/// turns them into "no suggestion", persistence degrades to an empty id and
/// lock-state failures fail open.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Upstream error ({status}): {message}")]
    UpstreamError { status: u16, message: String },

    #[error("Malformed response ({status}): {message}")]
    MalformedResponse { status: u16, message: String },

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Policy state failure: {0}")]
    PolicyStateFailure(String),
}

impl EngineError {
    /// Status code carried by a failed fetch result.
    ///
    /// Transport and parse failures report 500; upstream failures keep the
    /// status the service answered with.
    pub const fn status(&self) -> u16 {
        match self {
            Self::UpstreamError { status, .. } | Self::MalformedResponse { status, .. } => *status,
            Self::NetworkFailure(_) | Self::PersistenceFailure(_) | Self::PolicyStateFailure(_) => {
                INTERNAL_FAILURE_STATUS
            }
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            status: INTERNAL_FAILURE_STATUS,
            message: message.into(),
        }
    }

    /// Re-tag a collaborator failure as a lock-state failure.
    #[must_use]
    pub fn into_policy_failure(self) -> Self {
        match self {
            Self::PolicyStateFailure(_) => self,
            other => Self::PolicyStateFailure(other.to_string()),
        }
    }

    /// Re-tag a collaborator failure as a persistence failure.
    #[must_use]
    pub fn into_persistence_failure(self) -> Self {
        match self {
            Self::PersistenceFailure(_) => self,
            other => Self::PersistenceFailure(other.to_string()),
        }
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_transport_failures() {
        assert_eq!(EngineError::NetworkFailure("refused".into()).status(), 500);
        assert_eq!(EngineError::malformed("not json").status(), 500);
    }

    #[test]
    fn test_status_keeps_upstream_code() {
        let err = EngineError::UpstreamError {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.status(), 503);

        let empty = EngineError::MalformedResponse {
            status: 200,
            message: "no suggestions".into(),
        };
        assert_eq!(empty.status(), 200);
    }

    #[test]
    fn test_retagging() {
        let err = EngineError::NetworkFailure("timeout".into()).into_policy_failure();
        assert!(matches!(err, EngineError::PolicyStateFailure(msg) if msg.contains("timeout")));

        let err = EngineError::UpstreamError {
            status: 502,
            message: "bad gateway".into(),
        }
        .into_persistence_failure();
        assert!(matches!(err, EngineError::PersistenceFailure(_)));
    }
}
