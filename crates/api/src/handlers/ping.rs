use axum::Json;
use serde::Serialize;

use crate::middleware::auth::ApiToken;
use crate::response::DataResponse;

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: &'static str,
}

/// GET /api/v1/ping -- lets the monitor plugin check its token.
pub async fn ping(_auth: ApiToken) -> Json<DataResponse<PingResponse>> {
    Json(DataResponse {
        data: PingResponse { message: "pong" },
    })
}
