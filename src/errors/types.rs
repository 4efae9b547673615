//! Error type definitions for the cafe directory service.
//!
//! A single application error enum covers the failure taxonomy the HTTP
//! surface needs: missing records, malformed client input, and opaque
//! store failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Referenced identifier does not exist
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Malformed or mismatched client input
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Underlying persistence failure, opaque to the caller
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    /// Create a not found error for a specific resource
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a bad request error with a custom message
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, self.to_string()).into_response()
            }
            AppError::BadRequest { .. } => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            // Internal detail is logged, never returned to the caller
            AppError::Database(e) => {
                error!("Database error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
