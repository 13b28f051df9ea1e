use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::ApiToken;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CacheResponse {
    /// Number of linked problem ids now cached.
    pub cached: usize,
}

/// POST /api/v1/cache/refresh
///
/// Rebuild the problem cache from the store.
pub async fn refresh(
    State(state): State<AppState>,
    _auth: ApiToken,
) -> AppResult<Json<DataResponse<CacheResponse>>> {
    let cached = state.cache.refresh(&state.pool).await?;
    tracing::info!(cached, "Problem cache refreshed on request");
    Ok(Json(DataResponse {
        data: CacheResponse { cached },
    }))
}
