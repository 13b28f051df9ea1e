//! Problem-to-request links (`t_problem_request_links`) and joined views.

use alertdesk_core::problem::Classification;
use alertdesk_core::types::{DbId, ExternalRequestId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Correlation record. The columns are named `alert_id` / `request_id` in the
/// table; both hold internal row ids.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Link {
    pub id: DbId,
    pub problem_ref: DbId,
    pub request_ref: DbId,
    pub linked_at: Timestamp,
}

/// Row ids written by one atomic correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Correlation {
    pub problem_ref: DbId,
    pub request_ref: DbId,
    pub link_id: DbId,
}

/// A linked problem as seen from its desk request.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CorrelatedProblem {
    pub request_id: ExternalRequestId,
    pub request_status: Option<String>,
    pub problem_ref: DbId,
    pub problem_id: String,
    #[sqlx(try_from = "String")]
    pub classification: Classification,
    pub host_name: String,
    pub service_check_command: Option<String>,
    pub service_description: Option<String>,
    pub state: Option<String>,
    pub acknowledged: bool,
    pub linked_at: Timestamp,
}
