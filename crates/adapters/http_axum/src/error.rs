//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use bookshelf_domain::error::{BusError, ShelfError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`ShelfError`] to an HTTP status code and message.
pub(crate) fn classify(err: &ShelfError) -> (StatusCode, String) {
    match err {
        ShelfError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
        ShelfError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
        ShelfError::Conflict(err) => (StatusCode::CONFLICT, err.to_string()),
        ShelfError::Bus(err @ BusError::TimedOut { .. }) => {
            tracing::warn!(error = %err, "completion event timed out");
            (StatusCode::GATEWAY_TIMEOUT, err.to_string())
        }
        ShelfError::Bus(err) => {
            tracing::error!(error = %err, "event bus error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
        ShelfError::Repository(err) => {
            tracing::error!(error = %err, "repository error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}

/// JSON error response for `/api/*`.
pub struct ApiError(ShelfError);

impl From<ShelfError> for ApiError {
    fn from(err: ShelfError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = classify(&self.0);
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
