//! Repository for the `t_servicedesk_requests` table.

use alertdesk_core::types::{DbId, ExternalRequestId};
use sqlx::SqliteExecutor;

use crate::error::StoreError;
use crate::models::desk_request::{CreateDeskRequest, DeskRequest};

/// Column list for `t_servicedesk_requests` queries.
const COLUMNS: &str = "id, request_id, status, created_at, updated_at";

/// Provides read/write operations for desk requests.
pub struct DeskRequestRepo;

impl DeskRequestRepo {
    /// Insert a desk request, returning its row id.
    ///
    /// Fails with [`StoreError::Conflict`] if the desk id is already recorded.
    pub async fn insert<'e, E: SqliteExecutor<'e>>(
        executor: E,
        input: &CreateDeskRequest,
    ) -> Result<DbId, StoreError> {
        Ok(sqlx::query_scalar(
            "INSERT INTO t_servicedesk_requests (request_id, status) VALUES (?, ?) RETURNING id",
        )
        .bind(input.request_id)
        .bind(&input.status)
        .fetch_one(executor)
        .await?)
    }

    /// Find a desk request by the desk's own id.
    pub async fn find_by_request_id<'e, E: SqliteExecutor<'e>>(
        executor: E,
        request_id: ExternalRequestId,
    ) -> Result<Option<DeskRequest>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM t_servicedesk_requests WHERE request_id = ?");
        Ok(sqlx::query_as::<_, DeskRequest>(&query)
            .bind(request_id)
            .fetch_optional(executor)
            .await?)
    }
}
