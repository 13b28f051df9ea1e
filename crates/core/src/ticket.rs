//! Desk ticket drafts.
//!
//! Maps a [`ProblemEvent`] onto the fields of a desk request. Host and service
//! problems use different desk templates and different custom field sets; the
//! custom field keys are installation specific and come from configuration.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::problem::{Classification, ProblemEvent};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Keys of the desk's custom ("udf") fields the bridge fills in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub host_name: String,
    pub host_alias: String,
    pub host_ipv4: String,
    pub host_state: String,
    pub host_output: String,
    pub host_url: String,
    pub host_check_command: String,
    pub host_last_state_change: String,
    pub host_last_up: String,
    pub service_name: String,
    pub service_description: String,
    pub service_state: String,
    pub service_output: String,
    pub service_output_long: String,
    pub service_check_command: String,
    pub service_last_state_change: String,
    pub service_url: String,
    pub contacts: String,
    pub alarm_date: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            host_name: "udf_hostname".into(),
            host_alias: "udf_hostalias".into(),
            host_ipv4: "udf_hostipv4".into(),
            host_state: "udf_hoststate".into(),
            host_output: "udf_hostoutput".into(),
            host_url: "udf_hosturl".into(),
            host_check_command: "udf_hostcheckcommand".into(),
            host_last_state_change: "udf_hostlaststatechange".into(),
            host_last_up: "udf_hostlaststateup".into(),
            service_name: "udf_servicename".into(),
            service_description: "udf_servicedescription".into(),
            service_state: "udf_servicestatus".into(),
            service_output: "udf_serviceoutput".into(),
            service_output_long: "udf_serviceoutputlong".into(),
            service_check_command: "udf_servicecheckcommand".into(),
            service_last_state_change: "udf_servicelaststatechange".into(),
            service_url: "udf_serviceurl".into(),
            contacts: "udf_contacts".into(),
            alarm_date: "udf_alarmdate".into(),
        }
    }
}

/// Desk pick-list ids for host states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostStateIds {
    pub up: Option<i64>,
    pub down: Option<i64>,
    pub unreach: Option<i64>,
}

/// Desk pick-list ids for service states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceStateIds {
    pub ok: Option<i64>,
    pub warn: Option<i64>,
    pub critical: Option<i64>,
    pub unknown: Option<i64>,
}

/// Everything needed to turn a problem event into a ticket draft.
#[derive(Debug, Clone)]
pub struct TicketSettings {
    pub host_template_id: i64,
    pub service_template_id: i64,
    pub description: String,
    pub impact_details: String,
    pub resolution: String,
    /// `<monitor url>/<site>`, prepended to the monitor's relative links.
    pub monitor_base_url: Option<String>,
    pub fields: FieldNames,
    pub host_states: HostStateIds,
    pub service_states: ServiceStateIds,
}

impl Default for TicketSettings {
    fn default() -> Self {
        Self {
            host_template_id: 0,
            service_template_id: 0,
            description: "This request has been created by Checkmk.".into(),
            impact_details: "None".into(),
            resolution: "None".into(),
            monitor_base_url: None,
            fields: FieldNames::default(),
            host_states: HostStateIds::default(),
            service_states: ServiceStateIds::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Ticket priority. Monitor-created tickets are always raised as `High`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Priority {
    pub id: i64,
    pub name: &'static str,
    pub color: &'static str,
}

pub const PRIORITY_HIGH: Priority = Priority {
    id: 4,
    name: "High",
    color: "#ff0000",
};

/// A pick-list value: the state name and, when configured, its desk id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickField {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// The field mapping of one desk request, ready to hand to the desk client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketDraft {
    pub subject: String,
    pub description: String,
    pub impact_details: String,
    pub resolution: String,
    pub priority: Priority,
    /// Custom field values keyed by the configured field names.
    pub udf_fields: Map<String, Value>,
}

impl TicketSettings {
    /// Desk template used for problems of the given classification.
    pub fn template_for(&self, classification: Classification) -> i64 {
        match classification {
            Classification::Host => self.host_template_id,
            Classification::Service => self.service_template_id,
        }
    }

    /// Build the ticket draft for a problem event.
    ///
    /// Fails with [`CoreError::Validation`] when the event lacks a state or
    /// carries a state name the desk pick-lists do not know.
    pub fn build_ticket(&self, event: &ProblemEvent) -> Result<TicketDraft, CoreError> {
        let (subject, udf_fields) = match event.classification {
            Classification::Host => self.host_fields(event)?,
            Classification::Service => self.service_fields(event)?,
        };

        Ok(TicketDraft {
            subject,
            description: self.description.clone(),
            impact_details: self.impact_details.clone(),
            resolution: self.resolution.clone(),
            priority: PRIORITY_HIGH,
            udf_fields,
        })
    }

    fn host_fields(&self, event: &ProblemEvent) -> Result<(String, Map<String, Value>), CoreError> {
        let f = &self.fields;
        let host = &event.host;
        let state = self.host_state_pick(event.state())?;
        let subject = format!("Host Alert: {} - {}", host.name, state.name);

        let mut udf = UdfFields::default();
        udf.text(&f.host_name, Some(host.name.as_str()));
        udf.text(&f.host_alias, host.alias.as_deref());
        udf.text(&f.host_ipv4, host.ipv4.as_deref());
        udf.pick(&f.host_state, state);
        udf.text(&f.host_output, host.output.as_deref());
        udf.text(&f.host_check_command, host.check_command.as_deref());
        udf.link(&f.host_url, host.url.as_deref(), self.monitor_base_url.as_deref());
        udf.time(&f.host_last_state_change, host.last_state_change);
        udf.time(&f.host_last_up, host.last_up);
        udf.text(&f.contacts, event.contacts.as_deref());
        udf.time(&f.alarm_date, event.notified_at);

        Ok((subject, udf.0))
    }

    fn service_fields(
        &self,
        event: &ProblemEvent,
    ) -> Result<(String, Map<String, Value>), CoreError> {
        let f = &self.fields;
        let host = &event.host;
        let service = event.service.as_ref().ok_or_else(|| {
            CoreError::Validation("Service problem without service fields".into())
        })?;
        let state = self.service_state_pick(event.state())?;
        let subject = format!(
            "Service Alert: {} - {}",
            service.description.as_deref().unwrap_or("unknown service"),
            state.name
        );

        let mut udf = UdfFields::default();
        udf.text(&f.service_name, service.name.as_deref());
        udf.text(&f.service_description, service.description.as_deref());
        udf.pick(&f.service_state, state);
        udf.text(&f.service_output, service.output.as_deref());
        udf.text(&f.service_output_long, service.output_long.as_deref());
        udf.text(&f.service_check_command, service.check_command.as_deref());
        udf.time(&f.service_last_state_change, service.last_state_change);
        udf.link(&f.service_url, service.url.as_deref(), self.monitor_base_url.as_deref());
        udf.text(&f.host_name, Some(host.name.as_str()));
        udf.text(&f.host_alias, host.alias.as_deref());
        udf.text(&f.host_ipv4, host.ipv4.as_deref());
        if let Some(host_state) = host.state.as_deref() {
            udf.pick(
                &f.host_state,
                PickField {
                    name: host_state.to_string(),
                    id: None,
                },
            );
        }
        udf.link(&f.host_url, host.url.as_deref(), self.monitor_base_url.as_deref());
        udf.text(&f.contacts, event.contacts.as_deref());
        udf.time(&f.alarm_date, event.notified_at);

        Ok((subject, udf.0))
    }

    fn host_state_pick(&self, state: Option<&str>) -> Result<PickField, CoreError> {
        let name = state.ok_or_else(|| CoreError::Validation("Missing host state".into()))?;
        let ids = &self.host_states;
        let id = match name.to_ascii_uppercase().as_str() {
            "UP" => ids.up,
            "DOWN" => ids.down,
            "UNREACH" | "UNREACHABLE" => ids.unreach,
            _ => return Err(CoreError::Validation(format!("Unknown host state '{name}'"))),
        };
        Ok(PickField {
            name: name.to_string(),
            id,
        })
    }

    fn service_state_pick(&self, state: Option<&str>) -> Result<PickField, CoreError> {
        let name = state.ok_or_else(|| CoreError::Validation("Missing service state".into()))?;
        let ids = &self.service_states;
        let id = match name.to_ascii_uppercase().as_str() {
            "OK" => ids.ok,
            "WARN" | "WARNING" => ids.warn,
            "CRIT" | "CRITICAL" => ids.critical,
            "UNKNOWN" => ids.unknown,
            _ => {
                return Err(CoreError::Validation(format!(
                    "Unknown service state '{name}'"
                )))
            }
        };
        Ok(PickField {
            name: name.to_string(),
            id,
        })
    }
}

/// Custom field map that silently skips absent values.
#[derive(Default)]
struct UdfFields(Map<String, Value>);

impl UdfFields {
    fn text(&mut self, key: &str, value: Option<&str>) {
        if let Some(v) = value {
            self.0.insert(key.to_string(), Value::String(v.to_string()));
        }
    }

    fn pick(&mut self, key: &str, value: PickField) {
        self.0.insert(key.to_string(), serde_json::json!(value));
    }

    /// Desk date fields take `{ "value": <epoch millis> }`.
    fn time(&mut self, key: &str, value: Option<Timestamp>) {
        if let Some(ts) = value {
            self.0
                .insert(key.to_string(), serde_json::json!({ "value": ts.timestamp_millis() }));
        }
    }

    fn link(&mut self, key: &str, relative: Option<&str>, base: Option<&str>) {
        if let Some(path) = relative {
            let url = match base {
                Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
                None => path.to_string(),
            };
            self.0.insert(key.to_string(), Value::String(url));
        }
    }
}
