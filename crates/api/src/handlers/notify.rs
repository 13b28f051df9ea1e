//! Handlers for monitor notifications (`/notify`).
//!
//! The body is kept as raw JSON for the audit column, then parsed into the
//! typed notification and handed to the correlation engine.

use alertdesk_core::monitor::{HostNotification, ServiceNotification};
use alertdesk_core::problem::ProblemEvent;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::engine::CorrelationOutcome;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::ApiToken;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for a handled notification.
#[derive(Debug, Serialize)]
pub struct NotifyResponse {
    pub problem_id: String,
    #[serde(flatten)]
    pub outcome: CorrelationOutcome,
}

type NotifyResult = AppResult<(StatusCode, Json<DataResponse<NotifyResponse>>)>;

/// POST /api/v1/notify/host
pub async fn notify_host(
    State(state): State<AppState>,
    _auth: ApiToken,
    Json(raw): Json<Value>,
) -> NotifyResult {
    let notification: HostNotification = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::BadRequest(format!("Invalid host notification: {e}")))?;
    let event = notification.into_problem_event(raw)?;
    handle(&state, event).await
}

/// POST /api/v1/notify/service
pub async fn notify_service(
    State(state): State<AppState>,
    _auth: ApiToken,
    Json(raw): Json<Value>,
) -> NotifyResult {
    let notification: ServiceNotification = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::BadRequest(format!("Invalid service notification: {e}")))?;
    let event = notification.into_problem_event(raw)?;
    handle(&state, event).await
}

/// Run the engine and map its outcome onto an HTTP response.
///
/// A failed ticket creation is an error response so the monitor retries.
async fn handle(state: &AppState, event: ProblemEvent) -> NotifyResult {
    let outcome = state.engine.handle_problem(&event).await?;

    let status = match &outcome {
        CorrelationOutcome::Created { .. } => StatusCode::CREATED,
        CorrelationOutcome::AlreadyLinked { .. } | CorrelationOutcome::Ignored => StatusCode::OK,
        CorrelationOutcome::CreationFailed(failure) => {
            return Err(AppError::DeskFailure(failure.clone()));
        }
    };

    Ok((
        status,
        Json(DataResponse {
            data: NotifyResponse {
                problem_id: event.problem_id,
                outcome,
            },
        }),
    ))
}
