use alertdesk_core::error::CoreError;
use alertdesk_db::StoreError;
use alertdesk_desk::DeskErrorKind;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::engine::{CorrelationError, DeskFailure};

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent `{ "error", "code" }`
/// JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `alertdesk_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Correlation(#[from] CorrelationError),

    /// The desk did not create a ticket. Rendered as a retryable error so
    /// the monitor re-delivers the notification.
    #[error("Ticket creation failed: {0}")]
    DeskFailure(DeskFailure),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            AppError::Store(err) => internal("Store error", &err.to_string()),

            AppError::Correlation(CorrelationError::Integrity(msg)) => {
                tracing::error!(error = %msg, "Correlation integrity violated");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTEGRITY_ERROR",
                    "Correlation store is inconsistent".to_string(),
                )
            }
            AppError::Correlation(CorrelationError::Store(err)) => {
                internal("Store error", &err.to_string())
            }

            AppError::DeskFailure(failure) => {
                let (status, code) = match failure.kind {
                    DeskErrorKind::Authentication => (StatusCode::BAD_GATEWAY, "DESK_AUTH_FAILED"),
                    DeskErrorKind::Validation => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "DESK_VALIDATION_FAILED")
                    }
                    DeskErrorKind::Transient => {
                        (StatusCode::SERVICE_UNAVAILABLE, "DESK_UNAVAILABLE")
                    }
                };
                (status, code, failure.message.clone())
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Log the detail and return a sanitized 500.
fn internal(context: &str, detail: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "{context}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
