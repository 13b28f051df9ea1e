//! Normalized problem events.
//!
//! A [`ProblemEvent`] is what the correlation engine consumes: one sighting of
//! a monitoring problem, already stripped of the monitor's transport format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Problem id the monitor sends when there is no open problem (recoveries).
pub const NO_PROBLEM_ID: &str = "0";

/// Whether a problem concerns a whole host or a single service on a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Host,
    Service,
}

impl Classification {
    /// The value stored in the `type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Host => "host",
            Classification::Service => "service",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "host" => Ok(Classification::Host),
            "service" => Ok(Classification::Service),
            other => Err(CoreError::Validation(format!(
                "Unknown problem classification '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for Classification {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Host attributes carried by every problem event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostFields {
    pub name: String,
    pub alias: Option<String>,
    pub ipv4: Option<String>,
    pub state: Option<String>,
    pub output: Option<String>,
    /// Monitor-relative URL of the host page.
    pub url: Option<String>,
    pub check_command: Option<String>,
    pub last_state_change: Option<Timestamp>,
    pub last_up: Option<Timestamp>,
}

/// Service attributes, present only for [`Classification::Service`] events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub check_command: Option<String>,
    pub state: Option<String>,
    pub output: Option<String>,
    pub output_long: Option<String>,
    /// Monitor-relative URL of the service page.
    pub url: Option<String>,
    pub last_state_change: Option<Timestamp>,
}

/// One sighting of a monitoring problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemEvent {
    /// The monitor's problem identifier, unique per problem instance.
    pub problem_id: String,
    pub classification: Classification,
    pub host: HostFields,
    pub service: Option<ServiceFields>,
    pub contacts: Option<String>,
    pub notification_type: Option<String>,
    pub notified_at: Option<Timestamp>,
    pub acknowledged: bool,
    /// The payload exactly as received, kept for audit.
    pub raw_payload: serde_json::Value,
}

impl ProblemEvent {
    /// Current state of the problem target (service state for service
    /// problems, host state otherwise).
    pub fn state(&self) -> Option<&str> {
        match self.classification {
            Classification::Service => self
                .service
                .as_ref()
                .and_then(|s| s.state.as_deref()),
            Classification::Host => self.host.state.as_deref(),
        }
    }

    /// A recovery notification carries no open problem and never opens a ticket.
    pub fn is_recovery(&self) -> bool {
        self.problem_id == NO_PROBLEM_ID
    }

    pub fn service_check_command(&self) -> Option<&str> {
        self.service
            .as_ref()
            .and_then(|s| s.check_command.as_deref())
    }

    pub fn service_description(&self) -> Option<&str> {
        self.service.as_ref().and_then(|s| s.description.as_deref())
    }
}
