//! Error types for vtel-vd HTTP handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Caller input failed validation (422)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Duplicate business key (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Ingestion run aborted (500)
    #[error("Ingestion failed: {0}")]
    Ingestion(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<vtel_common::Error> for ApiError {
    fn from(err: vtel_common::Error) -> Self {
        use vtel_common::Error as E;

        match err {
            E::NotFound(msg) => ApiError::NotFound(msg),
            E::Validation(msg) => ApiError::Validation(msg),
            E::Conflict(msg) => ApiError::Conflict(msg),
            E::Io(e) => ApiError::Io(e),
            e @ E::Ingestion { .. } => ApiError::Ingestion(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Ingestion(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INGESTION_ERROR", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Io(ref err) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", err.to_string()),
        };

        if status.is_server_error() {
            error!("{}: {}", error_code, message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use vtel_common::Error;

    #[test]
    fn test_common_errors_map_to_statuses() {
        let cases = [
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (Error::Validation("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (Error::Conflict("x".into()), StatusCode::CONFLICT),
            (Error::ingestion("car1.csv", "bad"), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Export("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Database(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
