//! Repository for the `t_problem_request_links` table.

use alertdesk_core::types::{DbId, ExternalRequestId};
use sqlx::SqliteExecutor;

use crate::error::StoreError;
use crate::models::link::{CorrelatedProblem, Link};

/// Column list for `t_problem_request_links` queries.
const COLUMNS: &str = "id, alert_id AS problem_ref, request_id AS request_ref, linked_at";

/// Provides read/write operations for problem-to-request links.
pub struct LinkRepo;

impl LinkRepo {
    /// Link a problem row to a desk request row, returning the link id.
    ///
    /// Fails with [`StoreError::Conflict`] if the problem is already linked and
    /// with [`StoreError::Integrity`] if either row does not exist.
    pub async fn insert<'e, E: SqliteExecutor<'e>>(
        executor: E,
        problem_ref: DbId,
        request_ref: DbId,
    ) -> Result<DbId, StoreError> {
        Ok(sqlx::query_scalar(
            "INSERT INTO t_problem_request_links (alert_id, request_id) VALUES (?, ?) RETURNING id",
        )
        .bind(problem_ref)
        .bind(request_ref)
        .fetch_one(executor)
        .await?)
    }

    /// The link of a problem row, if any.
    pub async fn find_by_problem_ref<'e, E: SqliteExecutor<'e>>(
        executor: E,
        problem_ref: DbId,
    ) -> Result<Option<Link>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM t_problem_request_links WHERE alert_id = ?");
        Ok(sqlx::query_as::<_, Link>(&query)
            .bind(problem_ref)
            .fetch_optional(executor)
            .await?)
    }

    /// Desk id of the ticket linked to an external problem id, if linked.
    pub async fn find_request_for_problem<'e, E: SqliteExecutor<'e>>(
        executor: E,
        problem_id: &str,
    ) -> Result<Option<ExternalRequestId>, StoreError> {
        Ok(sqlx::query_scalar(
            "SELECT r.request_id \
             FROM t_problem_request_links l \
             JOIN t_checkmk_problems p ON l.alert_id = p.id \
             JOIN t_servicedesk_requests r ON l.request_id = r.id \
             WHERE p.problem_id = ?",
        )
        .bind(problem_id)
        .fetch_optional(executor)
        .await?)
    }

    /// External ids of every problem that has at least one link.
    pub async fn linked_problem_ids<'e, E: SqliteExecutor<'e>>(
        executor: E,
    ) -> Result<Vec<String>, StoreError> {
        Ok(sqlx::query_scalar(
            "SELECT DISTINCT p.problem_id \
             FROM t_problem_request_links l \
             JOIN t_checkmk_problems p ON l.alert_id = p.id",
        )
        .fetch_all(executor)
        .await?)
    }

    /// The problem linked to a desk request, looked up by the desk's id.
    pub async fn find_problem_by_request<'e, E: SqliteExecutor<'e>>(
        executor: E,
        request_id: ExternalRequestId,
    ) -> Result<Option<CorrelatedProblem>, StoreError> {
        Ok(sqlx::query_as::<_, CorrelatedProblem>(
            "SELECT \
                r.request_id, \
                r.status AS request_status, \
                p.id AS problem_ref, \
                p.problem_id, \
                p.type AS classification, \
                p.host_name, \
                p.service_check_command, \
                p.service_description, \
                p.state, \
                p.acknowledged, \
                l.linked_at \
             FROM t_servicedesk_requests r \
             JOIN t_problem_request_links l ON r.id = l.request_id \
             JOIN t_checkmk_problems p ON l.alert_id = p.id \
             WHERE r.request_id = ?",
        )
        .bind(request_id)
        .fetch_optional(executor)
        .await?)
    }
}
