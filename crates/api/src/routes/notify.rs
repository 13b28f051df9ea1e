use axum::routing::post;
use axum::Router;

use crate::handlers::notify;
use crate::state::AppState;

/// Routes mounted at `/api/v1/notify`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/host", post(notify::notify_host))
        .route("/service", post(notify::notify_service))
}
