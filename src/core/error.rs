use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ErrorBody;

/// Generic message returned whenever internal detail must stay server-side.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred while processing your request";

/// Marker inserted into responses produced by [`AppError`], so the logging
/// middleware can tell a handled 500 apart from one escaping the handler
/// stack (panic, broken layer) that still needs a generic body.
#[derive(Debug, Clone, Copy)]
pub struct ErrorHandled;

#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The user's provider linkage is gone; only signing in again fixes it.
    /// Kept separate from [`AppError::Auth`] so callers can surface an
    /// actionable message.
    #[error("Re-authentication required: {0}")]
    ReauthRequired(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Upstream resource not found: {0}")]
    UpstreamNotFound(String),

    #[error("Upstream rate limited: {0}")]
    UpstreamRateLimited(String),

    /// Completion API answered but produced no usable content.
    #[error("Failed to generate content")]
    EmptyCompletion,

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Upstream timed out. Mapped to the same status as
    /// [`AppError::UpstreamService`] but kept distinct in logs; retryable.
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    #[error("Upstream service error: {0}")]
    UpstreamService(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Auth(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::ReauthRequired(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Validation(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::RateLimitExceeded(ref msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
            AppError::UpstreamNotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::UpstreamRateLimited(ref msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
            AppError::EmptyCompletion => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate content".to_string(),
            ),
            AppError::Configuration(ref msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_ERROR_MESSAGE.to_string(),
                )
            }
            AppError::UpstreamTimeout(ref msg) => {
                tracing::error!("Upstream timeout: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_ERROR_MESSAGE.to_string(),
                )
            }
            AppError::UpstreamService(ref msg) => {
                tracing::error!("Upstream service error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_ERROR_MESSAGE.to_string(),
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_ERROR_MESSAGE.to_string(),
                )
            }
        };

        let mut response = (
            status,
            Json(ErrorBody {
                error: message,
                request_id: None,
            }),
        )
            .into_response();
        response.extensions_mut().insert(ErrorHandled);
        response
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_oh_one_keeps_message() {
        let response = AppError::Auth("Unauthorized".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.extensions().get::<ErrorHandled>().is_some());
    }

    #[test]
    fn internal_errors_hide_detail() {
        let response =
            AppError::Internal("connection pool exhausted".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upstream_rate_limit_maps_to_429() {
        let response =
            AppError::UpstreamRateLimited("GitHub API rate limit exceeded".to_string())
                .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
