//! Application error types with consistent API responses.
//!
//! Every failure in the link/sync pipeline surfaces as one of these variants;
//! the `IntoResponse` impl below is the single place errors are converted into
//! the `{error: string}` envelope clients see.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Strava rejected the request: {0}")]
    ProviderRejected(String),

    #[error("Strava API unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Unexpected Strava response: {0}")]
    ProviderContract(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::ProviderRejected(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::ProviderUnavailable(_) | AppError::ProviderContract(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::BadRequest(msg)
            | AppError::ProviderRejected(msg)
            | AppError::ProviderUnavailable(msg)
            | AppError::ProviderContract(msg)
            | AppError::Database(msg) => msg.clone(),
            AppError::Unauthorized => "Authentication required".to_string(),
            AppError::Internal(err) => err.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, error = %message, "Request failed");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
