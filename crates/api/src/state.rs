use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::{CorrelationEngine, ProblemCache};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything heavy sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: alertdesk_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub engine: Arc<CorrelationEngine>,
    /// The engine's problem cache, shared with the refresh task.
    pub cache: Arc<ProblemCache>,
}
