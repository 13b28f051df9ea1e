//! The correlation engine: one ticket per monitoring problem.
//!
//! [`CorrelationEngine::handle_problem`] runs four steps:
//!
//! 1. Fast path: a cache hit means the problem is already linked.
//! 2. Confirm: on a miss, ask the store whether the problem is linked.
//! 3. Create: build the ticket and call the desk, holding no lock.
//! 4. Persist: write problem, desk request and link atomically.
//!
//! When the problem is already linked, the event still refreshes the problem
//! row (state, acknowledgement, payload). Request and link rows are never
//! touched on that path.
//!
//! Two handlers racing on the same problem may both reach step 3. The unique
//! link index lets exactly one of them commit in step 4; the other sees a
//! conflict and reports the winner's ticket. Its own desk ticket is left
//! unlinked and logged.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use alertdesk_core::problem::ProblemEvent;
use alertdesk_core::ticket::TicketSettings;
use alertdesk_core::types::ExternalRequestId;
use alertdesk_db::models::desk_request::CreateDeskRequest;
use alertdesk_db::models::problem::CreateProblem;
use alertdesk_db::repositories::{CorrelationRepo, LinkRepo, ProblemRepo};
use alertdesk_db::{DbPool, StoreError};
use alertdesk_desk::{DeskClient, DeskError, DeskErrorKind};
use serde::Serialize;

use super::cache::ProblemCache;

// ---------------------------------------------------------------------------
// Outcomes and errors
// ---------------------------------------------------------------------------

/// Result of handling one problem event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CorrelationOutcome {
    /// A ticket was created and linked.
    Created { request_id: ExternalRequestId },
    /// The problem already had a ticket. The id is unknown on a cache hit.
    AlreadyLinked { request_id: Option<ExternalRequestId> },
    /// The desk did not create a ticket. Nothing was written; safe to retry.
    CreationFailed(DeskFailure),
    /// Recovery notification without an open problem.
    Ignored,
}

/// Why the desk did not create a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeskFailure {
    pub kind: DeskErrorKind,
    pub message: String,
}

impl fmt::Display for DeskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl From<&DeskError> for DeskFailure {
    fn from(err: &DeskError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Failures the engine does not recover from.
#[derive(Debug, thiserror::Error)]
pub enum CorrelationError {
    /// A store invariant is broken. Indicates a bug, never an expected race.
    #[error("Correlation integrity violated: {0}")]
    Integrity(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CorrelationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Integrity(msg) => CorrelationError::Integrity(msg),
            other => CorrelationError::Store(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Decides, per problem event, whether a new desk ticket is needed.
pub struct CorrelationEngine {
    pool: DbPool,
    cache: Arc<ProblemCache>,
    desk: Arc<dyn DeskClient>,
    tickets: TicketSettings,
    desk_timeout: Duration,
}

impl CorrelationEngine {
    pub fn new(
        pool: DbPool,
        cache: Arc<ProblemCache>,
        desk: Arc<dyn DeskClient>,
        tickets: TicketSettings,
        desk_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            cache,
            desk,
            tickets,
            desk_timeout,
        }
    }

    pub fn cache(&self) -> &Arc<ProblemCache> {
        &self.cache
    }

    /// Handle one problem event.
    ///
    /// Conflicts and desk failures come back as outcomes; only store
    /// failures surface as errors.
    pub async fn handle_problem(
        &self,
        event: &ProblemEvent,
    ) -> Result<CorrelationOutcome, CorrelationError> {
        let problem_id = event.problem_id.as_str();

        if event.is_recovery() {
            tracing::debug!(
                host = %event.host.name,
                classification = %event.classification,
                "Recovery notification, nothing to correlate",
            );
            return Ok(CorrelationOutcome::Ignored);
        }

        // Step 1.
        if self.cache.contains(problem_id).await {
            tracing::debug!(problem_id, "Problem already linked (cache)");
            self.record_sighting(event).await;
            return Ok(CorrelationOutcome::AlreadyLinked { request_id: None });
        }

        // Step 2.
        let linked = LinkRepo::find_request_for_problem(&self.pool, problem_id).await?;
        if let Some(request_id) = linked {
            tracing::warn!(
                problem_id,
                request_id,
                "Cache missed a linked problem, refreshing from store",
            );
            self.cache.mark_linked(problem_id).await;
            if let Err(e) = self.cache.refresh(&self.pool).await {
                tracing::error!(error = %e, "Problem cache refresh failed");
            }
            self.record_sighting(event).await;
            return Ok(CorrelationOutcome::AlreadyLinked {
                request_id: Some(request_id),
            });
        }

        // Step 3.
        let template_id = self.tickets.template_for(event.classification);
        let ticket = match self.tickets.build_ticket(event) {
            Ok(ticket) => ticket,
            Err(e) => {
                tracing::warn!(problem_id, error = %e, "Ticket could not be built");
                return Ok(CorrelationOutcome::CreationFailed(DeskFailure {
                    kind: DeskErrorKind::Validation,
                    message: e.to_string(),
                }));
            }
        };

        let created = match tokio::time::timeout(
            self.desk_timeout,
            self.desk.create_request(template_id, &ticket),
        )
        .await
        {
            Ok(Ok(created)) => created,
            Ok(Err(e)) => return Ok(self.creation_failed(problem_id, &e)),
            Err(_) => {
                let e = DeskError::Timeout(self.desk_timeout);
                return Ok(self.creation_failed(problem_id, &e));
            }
        };

        // Step 4.
        let problem = CreateProblem::from(event);
        let request = CreateDeskRequest {
            request_id: created.id,
            status: created.status.clone(),
        };

        match CorrelationRepo::record(&self.pool, &problem, &request).await {
            Ok(correlation) => {
                self.cache.mark_linked(problem_id).await;
                tracing::info!(
                    problem_id,
                    request_id = created.id,
                    link_id = correlation.link_id,
                    classification = %event.classification,
                    "Ticket created and linked",
                );
                Ok(CorrelationOutcome::Created {
                    request_id: created.id,
                })
            }
            Err(StoreError::Conflict(msg)) => {
                let outcome = self.resolve_conflict(problem_id, created.id, &msg).await?;
                self.record_sighting(event).await;
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(
                    problem_id,
                    orphan_request_id = created.id,
                    error = %e,
                    "Ticket created but correlation could not be stored",
                );
                Err(e.into())
            }
        }
    }

    /// Update the problem row of an already linked problem with this
    /// sighting. A failure is logged; the outcome stays `AlreadyLinked`.
    async fn record_sighting(&self, event: &ProblemEvent) {
        let problem = CreateProblem::from(event);
        if let Err(e) = ProblemRepo::upsert(&self.pool, &problem).await {
            tracing::warn!(
                problem_id = %event.problem_id,
                error = %e,
                "Problem sighting could not be recorded",
            );
        }
    }

    fn creation_failed(&self, problem_id: &str, err: &DeskError) -> CorrelationOutcome {
        tracing::warn!(
            problem_id,
            kind = %err.kind(),
            error = %err,
            "Desk did not create a ticket",
        );
        CorrelationOutcome::CreationFailed(DeskFailure::from(err))
    }

    /// A concurrent handler linked the problem first. Report its ticket and
    /// leave ours as an orphan.
    async fn resolve_conflict(
        &self,
        problem_id: &str,
        orphan_request_id: ExternalRequestId,
        conflict: &str,
    ) -> Result<CorrelationOutcome, CorrelationError> {
        match LinkRepo::find_request_for_problem(&self.pool, problem_id).await? {
            Some(request_id) => {
                self.cache.mark_linked(problem_id).await;
                tracing::warn!(
                    problem_id,
                    request_id,
                    orphan_request_id,
                    "Lost correlation race, desk ticket left unlinked",
                );
                Ok(CorrelationOutcome::AlreadyLinked {
                    request_id: Some(request_id),
                })
            }
            None => {
                // The desk handed out an id that is already linked elsewhere.
                tracing::error!(
                    problem_id,
                    request_id = orphan_request_id,
                    conflict,
                    "Desk request id already recorded for another problem",
                );
                Err(CorrelationError::Integrity(format!(
                    "desk request {orphan_request_id} is already recorded: {conflict}"
                )))
            }
        }
    }
}
