//! Monitor notification payloads.
//!
//! The monitor's notification plugin forwards its `NOTIFY_*` environment as a
//! JSON object. Every key is accepted either under the monitor's own name or
//! as the snake_case field name, but not both: a payload that carries the
//! same field under both names is rejected as a duplicate field. Payloads are
//! validated and converted into a [`ProblemEvent`] before they reach the
//! correlation engine.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::problem::{Classification, HostFields, ProblemEvent, ServiceFields};
use crate::types::Timestamp;

/// Notification type the monitor sends when a problem gets acknowledged.
const ACKNOWLEDGEMENT_PREFIX: &str = "ACKNOWLEDGEMENT";

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// A host problem notification.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct HostNotification {
    #[serde(default, alias = "NOTIFY_HOSTPROBLEMID")]
    #[validate(length(min = 1, max = 64))]
    pub host_problem_id: Option<String>,
    #[serde(default, alias = "NOTIFY_HOSTNAME")]
    #[validate(length(min = 1, max = 255))]
    pub host_name: Option<String>,
    #[serde(default, alias = "NOTIFY_HOSTALIAS")]
    pub host_alias: Option<String>,
    #[serde(default, alias = "NOTIFY_HOST_ADDRESS_4")]
    pub host_ipv4: Option<String>,
    #[serde(default, alias = "NOTIFY_HOSTSTATE")]
    pub host_state: Option<String>,
    #[serde(default, alias = "NOTIFY_HOSTOUTPUT")]
    pub host_output: Option<String>,
    #[serde(default, alias = "NOTIFY_HOSTURL")]
    pub host_url: Option<String>,
    #[serde(default, alias = "NOTIFY_HOSTCHECKCOMMAND")]
    pub host_check_command: Option<String>,
    #[serde(
        default,
        alias = "NOTIFY_LASTHOSTSTATECHANGE",
        deserialize_with = "flexible_timestamp"
    )]
    pub host_last_state_change: Option<Timestamp>,
    #[serde(
        default,
        alias = "NOTIFY_LASTHOSTUP",
        deserialize_with = "flexible_timestamp"
    )]
    pub host_last_up: Option<Timestamp>,
    #[serde(default, alias = "NOTIFY_NOTIFICATIONTYPE")]
    pub notification_type: Option<String>,
    #[serde(
        default,
        alias = "NOTIFY_LONGDATETIME",
        deserialize_with = "flexible_timestamp"
    )]
    pub notification_datetime: Option<Timestamp>,
    #[serde(default, alias = "NOTIFY_CONTACTS")]
    pub contacts: Option<String>,
}

/// A service problem notification.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ServiceNotification {
    #[serde(default, alias = "NOTIFY_SERVICEPROBLEMID")]
    #[validate(length(min = 1, max = 64))]
    pub service_problem_id: Option<String>,
    #[serde(default, alias = "NOTIFY_SERVICEDISPLAYNAME")]
    pub service_name: Option<String>,
    #[serde(default, alias = "NOTIFY_SERVICEDESC")]
    #[validate(length(min = 1, max = 255))]
    pub service_desc: Option<String>,
    #[serde(default, alias = "NOTIFY_SERVICESTATE")]
    pub service_state: Option<String>,
    #[serde(default, alias = "NOTIFY_SERVICEOUTPUT")]
    pub service_output: Option<String>,
    #[serde(default, alias = "NOTIFY_LONGSERVICEOUTPUT")]
    pub service_output_long: Option<String>,
    #[serde(default, alias = "NOTIFY_SERVICECHECKCOMMAND")]
    pub service_check_command: Option<String>,
    #[serde(default, alias = "NOTIFY_SERVICEURL")]
    pub service_url: Option<String>,
    #[serde(
        default,
        alias = "NOTIFY_LASTSERVICESTATECHANGE",
        deserialize_with = "flexible_timestamp"
    )]
    pub service_last_state_change: Option<Timestamp>,
    #[serde(default, alias = "NOTIFY_HOSTNAME")]
    #[validate(length(min = 1, max = 255))]
    pub host_name: Option<String>,
    #[serde(default, alias = "NOTIFY_HOSTALIAS")]
    pub host_alias: Option<String>,
    #[serde(default, alias = "NOTIFY_HOST_ADDRESS_4")]
    pub host_ipv4: Option<String>,
    #[serde(default, alias = "NOTIFY_HOSTSTATE")]
    pub host_state: Option<String>,
    #[serde(default, alias = "NOTIFY_HOSTURL")]
    pub host_url: Option<String>,
    #[serde(default, alias = "NOTIFY_NOTIFICATIONTYPE")]
    pub notification_type: Option<String>,
    #[serde(
        default,
        alias = "NOTIFY_LONGDATETIME",
        deserialize_with = "flexible_timestamp"
    )]
    pub notification_datetime: Option<Timestamp>,
    #[serde(default, alias = "NOTIFY_CONTACTS")]
    pub contacts: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

impl HostNotification {
    /// Validate the payload and turn it into a [`ProblemEvent`].
    pub fn into_problem_event(
        self,
        raw_payload: serde_json::Value,
    ) -> Result<ProblemEvent, CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        let problem_id = required(self.host_problem_id, "host_problem_id")?;
        let name = required(self.host_name, "host_name")?;
        let acknowledged = is_acknowledgement(self.notification_type.as_deref());

        Ok(ProblemEvent {
            problem_id,
            classification: Classification::Host,
            host: HostFields {
                name,
                alias: self.host_alias,
                ipv4: self.host_ipv4,
                state: self.host_state,
                output: self.host_output,
                url: self.host_url,
                check_command: self.host_check_command,
                last_state_change: self.host_last_state_change,
                last_up: self.host_last_up,
            },
            service: None,
            contacts: self.contacts,
            notification_type: self.notification_type,
            notified_at: self.notification_datetime,
            acknowledged,
            raw_payload,
        })
    }
}

impl ServiceNotification {
    /// Validate the payload and turn it into a [`ProblemEvent`].
    pub fn into_problem_event(
        self,
        raw_payload: serde_json::Value,
    ) -> Result<ProblemEvent, CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        let problem_id = required(self.service_problem_id, "service_problem_id")?;
        let name = required(self.host_name, "host_name")?;
        let acknowledged = is_acknowledgement(self.notification_type.as_deref());

        Ok(ProblemEvent {
            problem_id,
            classification: Classification::Service,
            host: HostFields {
                name,
                alias: self.host_alias,
                ipv4: self.host_ipv4,
                state: self.host_state,
                url: self.host_url,
                ..Default::default()
            },
            service: Some(ServiceFields {
                name: self.service_name,
                description: self.service_desc,
                check_command: self.service_check_command,
                state: self.service_state,
                output: self.service_output,
                output_long: self.service_output_long,
                url: self.service_url,
                last_state_change: self.service_last_state_change,
            }),
            contacts: self.contacts,
            notification_type: self.notification_type,
            notified_at: self.notification_datetime,
            acknowledged,
            raw_payload,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, CoreError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::Validation(format!("Missing required field '{field}'")))
}

fn is_acknowledgement(notification_type: Option<&str>) -> bool {
    notification_type.is_some_and(|t| t.starts_with(ACKNOWLEDGEMENT_PREFIX))
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Accepts unix seconds (number or string) and the textual formats in
/// [`parse_timestamp`]. Empty strings and `null` become `None`.
fn flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid unix timestamp {n}"))),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unrecognized timestamp '{s}'"))),
        Some(other) => Err(de::Error::custom(format!(
            "expected timestamp string or number, got {other}"
        ))),
    }
}

/// Parse the timestamp formats the monitor emits.
///
/// Supported: unix seconds, RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC),
/// `YYYY-MM-DD` (midnight UTC) and the long form
/// `Mon Oct 20 10:00:00 CEST 2025`.
pub fn parse_timestamp(input: &str) -> Option<Timestamp> {
    let s = input.trim();

    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        return s
            .parse::<i64>()
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n));
    }
    parse_long_datetime(s)
}

/// `Mon Oct 20 10:00:00 CEST 2025`: the zone abbreviation sits between the
/// time and the year, which chrono cannot parse directly.
fn parse_long_datetime(s: &str) -> Option<Timestamp> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    let [weekday, month, day, time, zone, year] = parts.as_slice() else {
        return None;
    };
    let offset_secs = match *zone {
        "UTC" | "GMT" => 0,
        "CET" => 3600,
        "CEST" => 7200,
        _ => return None,
    };
    let naive = NaiveDateTime::parse_from_str(
        &format!("{weekday} {month} {day} {time} {year}"),
        "%a %b %d %H:%M:%S %Y",
    )
    .ok()?;
    FixedOffset::east_opt(offset_secs)?
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
