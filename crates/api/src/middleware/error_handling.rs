//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON error bodies so every
//! endpoint reports failures the same way. Booking rejections keep their
//! machine-readable reason code in the body; database and internal failures
//! surface as a generic 500 without leaking detail.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use jobsync_core::errors::SchedulingError;

/// Application error wrapper that provides HTTP status code mapping.
///
/// `AppError` wraps domain-specific `SchedulingError` instances and
/// implements `IntoResponse` to convert them into HTTP responses with
/// appropriate status codes and JSON payloads.
#[derive(Debug)]
pub struct AppError(pub SchedulingError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            SchedulingError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, json!({ "error": msg }))
            }
            SchedulingError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": msg }))
            }
            SchedulingError::Conflict(rejection) => (
                StatusCode::CONFLICT,
                json!({
                    "error": &rejection.message,
                    "code": rejection.reason,
                    "conflicting_job_id": rejection.conflicting_job_id,
                }),
            ),
            // External-service failures are best-effort by design and should
            // never reach a caller; if one does, report a bad gateway.
            SchedulingError::ExternalService(msg) => {
                (StatusCode::BAD_GATEWAY, json!({ "error": msg }))
            }
            SchedulingError::Database(_) | SchedulingError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Automatic conversion from SchedulingError to AppError.
///
/// This implementation allows using `?` operator with functions that return
/// `Result<T, SchedulingError>` in handler functions that return
/// `Result<T, AppError>`.
impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        AppError(err)
    }
}

/// Automatic conversion from eyre::Report to AppError.
///
/// Repository failures are infrastructure errors; they map to the Database
/// variant and surface as a generic 500.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(SchedulingError::Database(err))
    }
}
