//! Handlers for correlation lookups (`/correlations`).

use alertdesk_core::error::CoreError;
use alertdesk_core::types::ExternalRequestId;
use alertdesk_db::models::link::CorrelatedProblem;
use alertdesk_db::repositories::CorrelationRepo;
use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::ApiToken;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/correlations/{request_id}
///
/// The problem linked to a desk request, by the desk's request id.
pub async fn get_by_request(
    State(state): State<AppState>,
    _auth: ApiToken,
    Path(request_id): Path<ExternalRequestId>,
) -> AppResult<Json<DataResponse<CorrelatedProblem>>> {
    let correlation = CorrelationRepo::find_by_request(&state.pool, request_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Correlation",
            id: request_id.to_string(),
        })?;
    Ok(Json(DataResponse { data: correlation }))
}
