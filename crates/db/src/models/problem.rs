//! Problem rows (`t_checkmk_problems`).

use alertdesk_core::problem::{Classification, ProblemEvent};
use alertdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// One monitoring problem, unique by its external `problem_id`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Problem {
    pub id: DbId,
    pub problem_id: String,
    #[sqlx(try_from = "String")]
    pub classification: Classification,
    pub host_name: String,
    pub service_check_command: Option<String>,
    pub service_description: Option<String>,
    pub state: Option<String>,
    pub acknowledged: bool,
    pub raw_payload: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting (or refreshing) a problem row.
#[derive(Debug, Clone)]
pub struct CreateProblem {
    pub problem_id: String,
    pub classification: Classification,
    pub host_name: String,
    pub service_check_command: Option<String>,
    pub service_description: Option<String>,
    pub state: Option<String>,
    pub acknowledged: bool,
    pub raw_payload: Option<String>,
}

impl From<&ProblemEvent> for CreateProblem {
    fn from(event: &ProblemEvent) -> Self {
        let raw_payload = match &event.raw_payload {
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        };
        Self {
            problem_id: event.problem_id.clone(),
            classification: event.classification,
            host_name: event.host.name.clone(),
            service_check_command: event.service_check_command().map(str::to_string),
            service_description: event.service_description().map(str::to_string),
            state: event.state().map(str::to_string),
            acknowledged: event.acknowledged,
            raw_payload,
        }
    }
}
