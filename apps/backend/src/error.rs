//! Error handling for the backend API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use drill_core::{ExerciseError, PracticeError, SnapshotError, StoreError};
use serde::Serialize;
use thiserror::Error;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Practice error: {0}")]
    Practice(#[from] PracticeError),

    #[error("Malformed snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid exercise: {0}")]
    Exercise(#[from] ExerciseError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Practice(e) => match e {
                PracticeError::OutOfRange { .. } => (StatusCode::CONFLICT, "out_of_range"),
                PracticeError::EmptyHistory => (StatusCode::CONFLICT, "empty_history"),
                PracticeError::NothingToRemove => (StatusCode::CONFLICT, "nothing_to_remove"),
                PracticeError::NothingToPronounce => (StatusCode::CONFLICT, "nothing_to_pronounce"),
                PracticeError::UnknownDirection(_) => (StatusCode::BAD_REQUEST, "unknown_direction"),
            },
            ApiError::Snapshot(_) | ApiError::Store(StoreError::Malformed(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "malformed_snapshot")
            }
            ApiError::Store(StoreError::PersistenceUnavailable(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "persistence_unavailable")
            }
            ApiError::Exercise(_) => (StatusCode::BAD_REQUEST, "invalid_exercise"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
