use axum::{http::StatusCode, response::{IntoResponse, Response}};
use thiserror::Error;

use crate::recurrence::RecurrenceError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("contact relay is not configured")]
    RelayUnavailable,
    #[error("contact relay request failed: {0}")]
    Relay(#[from] reqwest::Error),
    #[error(transparent)]
    Recurrence(#[from] RecurrenceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(e) => {
                log::error!("database error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
            AppError::Hash(e) => {
                log::error!("bcrypt failure: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
            AppError::Recurrence(e) => {
                // Only reachable for rows that predate write-side validation.
                log::error!("stored event failed to expand: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
            AppError::Relay(e) => {
                log::error!("contact relay request failed: {e}");
                (StatusCode::BAD_GATEWAY, "could not deliver your message".to_string())
            }
            AppError::RelayUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "the contact form is not available right now".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };
        (status, error_message).into_response()
    }
}
