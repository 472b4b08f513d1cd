// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// The identity provider could not validate the one-time session id.
    #[error("Identity provider rejected session: {0}")]
    UpstreamAuth(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Session expired")]
    SessionExpired,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("AI service not configured")]
    AdvisoryUnavailable,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for every variant that surfaces as 401.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AppError::Unauthorized | AppError::SessionExpired | AppError::UpstreamAuth(_)
        )
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::MissingInput(msg) => {
                (StatusCode::BAD_REQUEST, "missing_input", Some(msg.clone()))
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::UpstreamAuth(_) => (
                StatusCode::UNAUTHORIZED,
                "invalid_session_id",
                Some("Invalid session_id".to_string()),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::SessionExpired => (StatusCode::UNAUTHORIZED, "session_expired", None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone())),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::AdvisoryUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ai_not_configured",
                Some("AI service not configured".to_string()),
            ),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::MissingInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::UpstreamAuth("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AppError::SessionExpired, StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::AdvisoryUnavailable, StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_unauthenticated_variants() {
        assert!(AppError::Unauthorized.is_unauthenticated());
        assert!(AppError::SessionExpired.is_unauthenticated());
        assert!(AppError::UpstreamAuth("bad id".into()).is_unauthenticated());
        assert!(!AppError::Forbidden("x".into()).is_unauthenticated());
        assert!(!AppError::NotFound("x".into()).is_unauthenticated());
    }
}
