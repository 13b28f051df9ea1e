//! Desk request rows (`t_servicedesk_requests`).

use alertdesk_core::types::{DbId, ExternalRequestId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A ticket created in the service desk. `request_id` is the desk's own id.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeskRequest {
    pub id: DbId,
    pub request_id: ExternalRequestId,
    pub status: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a desk request row.
#[derive(Debug, Clone)]
pub struct CreateDeskRequest {
    pub request_id: ExternalRequestId,
    pub status: Option<String>,
}
