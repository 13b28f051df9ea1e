//! Periodic rebuild of the problem cache.
//!
//! Picks up links written by other processes sharing the database and
//! repairs any drift between the cache and the store.

use std::sync::Arc;
use std::time::Duration;

use alertdesk_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::engine::ProblemCache;

/// Run the refresh loop until `cancel` is triggered.
///
/// Failures are logged and retried on the next tick.
pub async fn run(
    cache: Arc<ProblemCache>,
    pool: DbPool,
    every: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = every.as_secs(), "Cache refresh job started");

    let mut interval = tokio::time::interval(every);
    // The cache was filled at startup.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Cache refresh job stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = cache.refresh(&pool).await {
                    tracing::error!(error = %e, "Cache refresh failed");
                }
            }
        }
    }
}
