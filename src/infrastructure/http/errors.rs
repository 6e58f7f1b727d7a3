use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::errors::EngineError;

/// Errors that can occur when talking to the remote services
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request parameters (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or rejected credentials (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden - permission denied (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded - too many requests")]
    RateLimitExceeded,

    /// Server error (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Body could not be decoded
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Unknown or unexpected status
    #[error("Unknown error ({0}): {1}")]
    UnknownError(StatusCode, String),
}

impl ApiError {
    /// Classify a non-success response.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::InvalidRequest(body),
            StatusCode::UNAUTHORIZED => Self::Unauthorized(body),
            StatusCode::FORBIDDEN => Self::Forbidden(body),
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimitExceeded,
            status if status.is_server_error() => Self::ServerError(status, body),
            _ => Self::UnknownError(status, body),
        }
    }

    /// Returns true if this error is transient and should be retried
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded | Self::ServerError(_, _) | Self::Timeout | Self::NetworkError(_)
        )
    }

    /// Returns true if this is a permanent error that should not be retried
    pub const fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::Unauthorized(_) | Self::Forbidden(_) | Self::NotFound
        )
    }

    /// HTTP status the server answered with, if it answered at all.
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::InvalidRequest(_) => Some(StatusCode::BAD_REQUEST),
            Self::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            Self::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            Self::NotFound => Some(StatusCode::NOT_FOUND),
            Self::RateLimitExceeded => Some(StatusCode::TOO_MANY_REQUESTS),
            Self::ServerError(status, _) | Self::UnknownError(status, _) => Some(*status),
            Self::NetworkError(_) | Self::Timeout | Self::Decode(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::NetworkError(err)
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<ApiError> for EngineError {
    fn from(err: ApiError) -> Self {
        let message = err.to_string();
        match err {
            ApiError::Decode(_) => Self::malformed(message),
            ApiError::NetworkError(_) | ApiError::Timeout => Self::NetworkFailure(message),
            other => Self::UpstreamError {
                status: other.status().map_or(500, |s| s.as_u16()),
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(ApiError::RateLimitExceeded.is_transient());
        assert!(
            ApiError::ServerError(StatusCode::INTERNAL_SERVER_ERROR, "test".to_string())
                .is_transient()
        );
        assert!(ApiError::Timeout.is_transient());
        assert!(!ApiError::Decode("eof".to_string()).is_transient());
    }

    #[test]
    fn test_permanent_errors() {
        assert!(ApiError::InvalidRequest("test".to_string()).is_permanent());
        assert!(ApiError::Unauthorized("test".to_string()).is_permanent());
        assert!(ApiError::Forbidden("test".to_string()).is_permanent());
        assert!(ApiError::NotFound.is_permanent());
    }

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "x".into()),
            ApiError::ServerError(StatusCode::BAD_GATEWAY, _)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, "x".into()),
            ApiError::UnknownError(StatusCode::IM_A_TEAPOT, _)
        ));
    }

    #[test]
    fn test_engine_error_mapping() {
        let err: EngineError = ApiError::ServerError(StatusCode::SERVICE_UNAVAILABLE, "down".into()).into();
        assert_eq!(err.status(), 503);
        assert!(matches!(err, EngineError::UpstreamError { .. }));

        let err: EngineError = ApiError::Timeout.into();
        assert!(matches!(err, EngineError::NetworkFailure(_)));
        assert_eq!(err.status(), 500);

        let err: EngineError = ApiError::Decode("expected value".into()).into();
        assert!(matches!(err, EngineError::MalformedResponse { status: 500, .. }));
    }
}
