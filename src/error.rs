//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::LedgerError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Domain errors
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            AppError::Ledger(ref err) => match err {
                // 400 Bad Request
                LedgerError::InvalidRequest => {
                    (StatusCode::BAD_REQUEST, "invalid_request", None)
                }
                LedgerError::WithdrawalLimitExceeded { .. } => (
                    StatusCode::BAD_REQUEST,
                    "withdrawal_limit_exceeded",
                    Some(err.to_string()),
                ),
                LedgerError::InsufficientBalance { .. } => (
                    StatusCode::BAD_REQUEST,
                    "insufficient_balance",
                    Some(err.to_string()),
                ),

                // 404 Not Found
                LedgerError::AccountNotFound(number) => {
                    (StatusCode::NOT_FOUND, "account_not_found", Some(number.clone()))
                }

                // 409 Conflict
                LedgerError::AccountAlreadyExists(number) => (
                    StatusCode::CONFLICT,
                    "account_already_exists",
                    Some(number.clone()),
                ),
                LedgerError::VersionConflict { .. } => {
                    (StatusCode::CONFLICT, "version_conflict", Some(err.to_string()))
                }
            },

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
