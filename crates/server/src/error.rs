//! HTTP-facing error type.
//!
//! Every error leaves the API as `{"status": "error", "detail": ...}` with
//! the matching status code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use data_loader::DataLoadError;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    /// Malformed body or a field constraint violation
    #[error("validation failed: {0}")]
    Validation(Value),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    /// Logged in full, reported to the client as `detail`
    #[error("{detail}")]
    Internal {
        detail: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn internal(detail: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AppError::Internal {
            detail: detail.into(),
            source: source.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Value {
        match self {
            AppError::Validation(errors) => errors.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::Internal { detail, source } => error!("{}: {:#}", detail, source),
            other => warn!(status = status.as_u16(), "{}", other),
        }
        let body = json!({ "status": "error", "detail": self.detail() });
        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let detail = serde_json::to_value(&errors).unwrap_or_else(|_| Value::String(errors.to_string()));
        AppError::Validation(detail)
    }
}

/// Rejected events are the caller's fault; anything else is ours.
impl From<DataLoadError> for AppError {
    fn from(err: DataLoadError) -> Self {
        match err {
            DataLoadError::ValidationError(msg) => AppError::BadRequest(msg),
            DataLoadError::InvalidValue { field, value } => {
                AppError::BadRequest(format!("Invalid value for {}: {}", field, value))
            }
            other => AppError::internal("Failed to log interaction", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Validation(json!([])).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::ServiceUnavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_rating_error_is_bad_request() {
        let err: AppError = DataLoadError::ValidationError(
            "Rating must be provided when event is 'rate'".to_string(),
        )
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Rating must be provided when event is 'rate'");
    }

    #[test]
    fn test_io_error_is_internal() {
        let err: AppError = DataLoadError::IoError(std::io::Error::other("disk full")).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to log interaction");
    }
}
