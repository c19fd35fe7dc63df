use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use floortrack_core::error::CoreError;
use floortrack_core::scan::ScanRejection;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON
/// error bodies. Scan rejections keep the wire-level reason string
/// (`{"error": "missing-order_code"}`) so the submitting device can
/// act on it.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `floortrack-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A scan payload rejected at the ingestion boundary.
    #[error(transparent)]
    Rejection(#[from] ScanRejection),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Rejection(rejection) => {
                (StatusCode::BAD_REQUEST, rejection.reason.to_string())
            }

            AppError::Core(core) => match core {
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                CoreError::Configuration(msg) => {
                    (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
                }
                CoreError::Storage(msg) | CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal-error".to_string(),
                    )
                }
            },

            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal-error".to_string(),
                )
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal-error".to_string(),
                )
            }
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
