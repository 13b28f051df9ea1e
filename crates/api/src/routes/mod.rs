pub mod health;
pub mod notify;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree. Every route requires the bearer token.
///
/// ```text
/// /ping                                 token check
///
/// /notify/host                          host problem notification (POST)
/// /notify/service                       service problem notification (POST)
///
/// /correlations/{request_id}            problem linked to a desk request
///
/// /cache/refresh                        rebuild the problem cache (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(handlers::ping::ping))
        .nest("/notify", notify::router())
        .route(
            "/correlations/{request_id}",
            get(handlers::correlations::get_by_request),
        )
        .route("/cache/refresh", post(handlers::cache::refresh))
}
