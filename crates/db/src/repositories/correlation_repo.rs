//! Atomic writes spanning problems, desk requests and links.

use alertdesk_core::types::ExternalRequestId;

use crate::error::StoreError;
use crate::models::desk_request::CreateDeskRequest;
use crate::models::link::{CorrelatedProblem, Correlation};
use crate::models::problem::CreateProblem;
use crate::repositories::{DeskRequestRepo, LinkRepo, ProblemRepo};
use crate::DbPool;

/// Records a problem together with the ticket created for it.
pub struct CorrelationRepo;

impl CorrelationRepo {
    /// Upsert the problem, insert the desk request and link the two in a
    /// single transaction. Nothing is written unless all three succeed.
    ///
    /// The problem upsert runs first so the transaction takes the write lock
    /// before any read; concurrent writers queue on the busy timeout instead
    /// of failing a lock upgrade.
    ///
    /// Returns [`StoreError::Conflict`] when the problem is already linked or
    /// the desk id is already recorded.
    pub async fn record(
        pool: &DbPool,
        problem: &CreateProblem,
        request: &CreateDeskRequest,
    ) -> Result<Correlation, StoreError> {
        let mut tx = pool.begin().await?;

        let problem_ref = ProblemRepo::upsert(&mut *tx, problem).await?;
        let request_ref = DeskRequestRepo::insert(&mut *tx, request).await?;
        let link_id = LinkRepo::insert(&mut *tx, problem_ref, request_ref).await?;

        tx.commit().await?;

        tracing::debug!(
            problem_id = %problem.problem_id,
            request_id = request.request_id,
            link_id,
            "Correlation recorded",
        );

        Ok(Correlation {
            problem_ref,
            request_ref,
            link_id,
        })
    }

    /// Look up the problem correlated with a desk request.
    pub async fn find_by_request(
        pool: &DbPool,
        request_id: ExternalRequestId,
    ) -> Result<Option<CorrelatedProblem>, StoreError> {
        LinkRepo::find_problem_by_request(pool, request_id).await
    }
}
