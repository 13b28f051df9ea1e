//! Wire types for the ServiceDesk Plus `requests` endpoint.

use alertdesk_core::ticket::{Priority, TicketDraft};
use alertdesk_core::types::ExternalRequestId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Status given to every request created from a monitoring problem.
pub const INITIAL_STATUS: &str = "Open";

/// Request type given to every request created from a monitoring problem.
pub const REQUEST_TYPE: &str = "Incident";

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// The `input_data` document: `{"request": {...}}`.
#[derive(Debug, Serialize)]
pub struct CreationEnvelope<'a> {
    pub request: CreationRequest<'a>,
}

#[derive(Debug, Serialize)]
pub struct CreationRequest<'a> {
    pub subject: &'a str,
    pub description: &'a str,
    pub requester: Requester<'a>,
    pub resolution: Resolution<'a>,
    pub impact_details: &'a str,
    pub status: Named<'a>,
    pub request_type: Named<'a>,
    pub template: TemplateRef,
    pub udf_fields: &'a Map<String, Value>,
    pub priority: &'a Priority,
}

#[derive(Debug, Serialize)]
pub struct Requester<'a> {
    pub id: i64,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Resolution<'a> {
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Named<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TemplateRef {
    pub id: i64,
}

impl<'a> CreationEnvelope<'a> {
    pub fn new(
        template_id: i64,
        ticket: &'a TicketDraft,
        requester_id: i64,
        requester_name: &'a str,
    ) -> Self {
        Self {
            request: CreationRequest {
                subject: &ticket.subject,
                description: &ticket.description,
                requester: Requester {
                    id: requester_id,
                    name: requester_name,
                },
                resolution: Resolution {
                    content: &ticket.resolution,
                },
                impact_details: &ticket.impact_details,
                status: Named {
                    name: INITIAL_STATUS,
                },
                request_type: Named { name: REQUEST_TYPE },
                template: TemplateRef { id: template_id },
                udf_fields: &ticket.udf_fields,
                priority: &ticket.priority,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// A request the desk confirmed as created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedRequest {
    pub id: ExternalRequestId,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreationResponse {
    pub request: Option<ResponseRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseRequest {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<ExternalRequestId>,
    pub status: Option<ResponseStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseStatus {
    pub name: Option<String>,
}

impl CreationResponse {
    /// The created request, if the body names one.
    pub fn into_created(self) -> Option<CreatedRequest> {
        let request = self.request?;
        Some(CreatedRequest {
            id: request.id?,
            status: request.status.and_then(|s| s.name),
        })
    }
}

/// The desk reports ids as strings in some versions and numbers in others.
fn flexible_id<'de, D>(deserializer: D) -> Result<Option<ExternalRequestId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
