//! HTTP error types for the framegate server.
//!
//! Every handler error funnels through [`AppError`], the single terminal
//! error responder: it logs the condition and emits a JSON body
//! `{statusCode, message}`. Nothing is silently swallowed — upstream PATCH
//! failures propagate here like everything else.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use framegate_core::error::{GuardError, KeyPathError};
use framegate_session::SessionError;

use crate::storage::UpstreamError;

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// The handshake token was missing, invalid, or already consumed.
    Rejected,
    /// Client sent malformed input.
    BadRequest(String),
    /// Requested resource (route or key path) not found.
    NotFound(String),
    /// The upstream request was sent but no response arrived.
    UpstreamUnavailable,
    /// The upstream responded with an error payload; forwarded verbatim.
    Upstream { status_code: u16, message: String },
    /// Internal server error.
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    #[serde(rename = "statusCode")]
    status_code: u16,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Rejected => (StatusCode::BAD_REQUEST, "Rejected".to_owned()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::UpstreamUnavailable => (
                StatusCode::BAD_GATEWAY,
                "No response from storage server".to_owned(),
            ),
            Self::Upstream {
                status_code,
                message,
            } => (
                StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message,
            ),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        tracing::error!(status = status.as_u16(), message = %message, "request failed");

        let body = ErrorBody {
            status_code: status.as_u16(),
            message,
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<GuardError> for AppError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Rejected => Self::Rejected,
            GuardError::Store(inner) => Self::Internal(inner.to_string()),
        }
    }
}

impl From<KeyPathError> for AppError {
    fn from(err: KeyPathError) -> Self {
        match err {
            KeyPathError::Empty => Self::BadRequest(err.to_string()),
            KeyPathError::NotFound { .. } => Self::NotFound(err.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Reported {
                status_code,
                message,
            } => Self::Upstream {
                status_code,
                message,
            },
            UpstreamError::NoResponse => Self::UpstreamUnavailable,
            UpstreamError::Request { reason } => Self::Internal(reason),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn rejected_guard_becomes_400() {
        let err: AppError = GuardError::Rejected.into();
        assert!(matches!(err, AppError::Rejected));
    }

    #[test]
    fn traversal_failure_becomes_404() {
        let err: AppError = KeyPathError::NotFound {
            path: "a.b".to_owned(),
            segment: "b".to_owned(),
        }
        .into();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn upstream_code_is_forwarded() {
        let err: AppError = UpstreamError::Reported {
            status_code: 503,
            message: "Storage server unavailable".to_owned(),
        }
        .into();
        match err {
            AppError::Upstream {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 503);
                assert_eq!(message, "Storage server unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
