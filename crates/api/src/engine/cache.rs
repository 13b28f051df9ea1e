//! Advisory cache of linked problem ids.
//!
//! A hit lets the engine skip the store entirely. A miss is always
//! confirmed against the store, so a cold or stale cache can cost an extra
//! query but never a duplicate ticket.

use std::collections::HashSet;

use alertdesk_db::repositories::LinkRepo;
use alertdesk_db::{DbPool, StoreError};
use tokio::sync::RwLock;

/// Set of external problem ids that already have a linked ticket.
#[derive(Default)]
pub struct ProblemCache {
    linked: RwLock<HashSet<String>>,
}

impl ProblemCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached set with every problem id that has a link in the
    /// store. Returns the number of cached ids.
    ///
    /// The store is read before the lock is taken; readers see either the
    /// old or the new set, never a partial one.
    pub async fn refresh(&self, pool: &DbPool) -> Result<usize, StoreError> {
        let ids: HashSet<String> = LinkRepo::linked_problem_ids(pool)
            .await?
            .into_iter()
            .collect();
        let count = ids.len();
        *self.linked.write().await = ids;
        tracing::debug!(count, "Problem cache refreshed");
        Ok(count)
    }

    pub async fn contains(&self, problem_id: &str) -> bool {
        self.linked.read().await.contains(problem_id)
    }

    /// Record a problem as linked after a successful correlation write.
    pub async fn mark_linked(&self, problem_id: &str) {
        self.linked.write().await.insert(problem_id.to_string());
    }

    pub async fn len(&self) -> usize {
        self.linked.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.linked.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mark_linked_is_visible_to_contains() {
        let cache = ProblemCache::new();
        assert!(cache.is_empty().await);
        assert!(!cache.contains("P-1").await);

        cache.mark_linked("P-1").await;
        cache.mark_linked("P-1").await;

        assert!(cache.contains("P-1").await);
        assert!(!cache.contains("P-2").await);
        assert_eq!(cache.len().await, 1);
    }
}
