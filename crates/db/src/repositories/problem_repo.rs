//! Repository for the `t_checkmk_problems` table.

use alertdesk_core::types::DbId;
use sqlx::SqliteExecutor;

use crate::error::StoreError;
use crate::models::problem::{CreateProblem, Problem};

/// Column list for `t_checkmk_problems` queries.
const COLUMNS: &str = "id, problem_id, type AS classification, host_name, \
    service_check_command, service_description, state, acknowledged, raw_payload, \
    created_at, updated_at";

/// Provides read/write operations for problems.
pub struct ProblemRepo;

impl ProblemRepo {
    /// Whether a problem row exists for the external problem id.
    pub async fn exists<'e, E: SqliteExecutor<'e>>(
        executor: E,
        problem_id: &str,
    ) -> Result<bool, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM t_checkmk_problems WHERE problem_id = ?")
                .bind(problem_id)
                .fetch_one(executor)
                .await?;
        Ok(count > 0)
    }

    /// Find a problem by its external problem id.
    pub async fn find_by_problem_id<'e, E: SqliteExecutor<'e>>(
        executor: E,
        problem_id: &str,
    ) -> Result<Option<Problem>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM t_checkmk_problems WHERE problem_id = ?");
        Ok(sqlx::query_as::<_, Problem>(&query)
            .bind(problem_id)
            .fetch_optional(executor)
            .await?)
    }

    /// Insert a new problem, returning its row id.
    ///
    /// Fails with [`StoreError::Conflict`] if the external id already exists.
    pub async fn insert<'e, E: SqliteExecutor<'e>>(
        executor: E,
        input: &CreateProblem,
    ) -> Result<DbId, StoreError> {
        Ok(sqlx::query_scalar(
            "INSERT INTO t_checkmk_problems \
                (problem_id, type, host_name, service_check_command, service_description, \
                 state, acknowledged, raw_payload) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING id",
        )
        .bind(&input.problem_id)
        .bind(input.classification.as_str())
        .bind(&input.host_name)
        .bind(&input.service_check_command)
        .bind(&input.service_description)
        .bind(&input.state)
        .bind(input.acknowledged)
        .bind(&input.raw_payload)
        .fetch_one(executor)
        .await?)
    }

    /// Insert a problem or, if the external id is already known, refresh its
    /// state, acknowledgement and payload. Returns the row id either way.
    pub async fn upsert<'e, E: SqliteExecutor<'e>>(
        executor: E,
        input: &CreateProblem,
    ) -> Result<DbId, StoreError> {
        Ok(sqlx::query_scalar(
            "INSERT INTO t_checkmk_problems \
                (problem_id, type, host_name, service_check_command, service_description, \
                 state, acknowledged, raw_payload) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (problem_id) DO UPDATE SET \
                state = excluded.state, \
                acknowledged = excluded.acknowledged, \
                raw_payload = excluded.raw_payload, \
                updated_at = CURRENT_TIMESTAMP \
             RETURNING id",
        )
        .bind(&input.problem_id)
        .bind(input.classification.as_str())
        .bind(&input.host_name)
        .bind(&input.service_check_command)
        .bind(&input.service_description)
        .bind(&input.state)
        .bind(input.acknowledged)
        .bind(&input.raw_payload)
        .fetch_one(executor)
        .await?)
    }
}
