use std::str::FromStr;
use std::time::Duration;

use alertdesk_core::ticket::{FieldNames, HostStateIds, ServiceStateIds, TicketSettings};
use alertdesk_desk::SdpConfig;

/// Server configuration loaded from environment variables.
///
/// Everything except `TOKEN_HASH` has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// SQLite database URL.
    pub database_url: String,
    pub db_max_connections: u32,
    /// Argon2 PHC hash of the bearer token the monitor presents.
    pub token_hash: String,
    /// Interval of the periodic cache refresh; `0` disables it.
    pub cache_refresh_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                     |
    /// |------------------------|---------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                   |
    /// | `PORT`                 | `8000`                                      |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                        |
    /// | `DATABASE_URL`         | `sqlite://data/alertdesk.sqlite3?mode=rwc`  |
    /// | `DB_MAX_CONNECTIONS`   | `5`                                         |
    /// | `TOKEN_HASH`           | required                                    |
    /// | `CACHE_REFRESH_SECS`   | `10`                                        |
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 8000),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30),
            database_url: env_or("DATABASE_URL", "sqlite://data/alertdesk.sqlite3?mode=rwc"),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", 5),
            token_hash: std::env::var("TOKEN_HASH").expect("TOKEN_HASH must be set"),
            cache_refresh_secs: env_parse("CACHE_REFRESH_SECS", 10),
        }
    }
}

/// Service desk connection and ticket layout.
#[derive(Debug, Clone)]
pub struct DeskConfig {
    pub client: SdpConfig,
    pub tickets: TicketSettings,
}

impl DeskConfig {
    /// Load desk configuration from environment variables.
    ///
    /// | Env Var                      | Default                  |
    /// |------------------------------|--------------------------|
    /// | `DESK_URL`                   | `https://localhost:8080` |
    /// | `DESK_API_VERSION`           | `v3`                     |
    /// | `DESK_SECRET`                | required                 |
    /// | `DESK_TIMEOUT_SECS`          | `20`                     |
    /// | `DESK_VERIFY_TLS`            | `true`                   |
    /// | `DESK_REQUESTER_ID`          | `604`                    |
    /// | `DESK_REQUESTER_NAME`        | `checkmk`                |
    /// | `DESK_HOST_TEMPLATE_ID`      | `0`                      |
    /// | `DESK_SERVICE_TEMPLATE_ID`   | `0`                      |
    /// | `DESK_HOST_{UP,DOWN,UNREACH}_ID` | unset                |
    /// | `DESK_SERVICE_{OK,WARN,CRITICAL,UNKNOWN}_ID` | unset    |
    /// | `DESK_FIELD_<NAME>`          | `udf_<name>` defaults    |
    /// | `MONITOR_URL`                | unset                    |
    /// | `MONITOR_SITE`               | unset                    |
    pub fn from_env() -> Self {
        let client = SdpConfig {
            base_url: env_or("DESK_URL", "https://localhost:8080"),
            api_version: env_or("DESK_API_VERSION", "v3"),
            secret: std::env::var("DESK_SECRET").expect("DESK_SECRET must be set"),
            timeout: Duration::from_secs(env_parse("DESK_TIMEOUT_SECS", 20)),
            verify_tls: env_parse("DESK_VERIFY_TLS", true),
            requester_id: env_parse("DESK_REQUESTER_ID", 604),
            requester_name: env_or("DESK_REQUESTER_NAME", "checkmk"),
        };

        let defaults = TicketSettings::default();
        let tickets = TicketSettings {
            host_template_id: env_parse("DESK_HOST_TEMPLATE_ID", 0),
            service_template_id: env_parse("DESK_SERVICE_TEMPLATE_ID", 0),
            monitor_base_url: monitor_base_url(
                std::env::var("MONITOR_URL").ok(),
                std::env::var("MONITOR_SITE").ok(),
            ),
            fields: field_names_from_env(),
            host_states: HostStateIds {
                up: env_opt("DESK_HOST_UP_ID"),
                down: env_opt("DESK_HOST_DOWN_ID"),
                unreach: env_opt("DESK_HOST_UNREACH_ID"),
            },
            service_states: ServiceStateIds {
                ok: env_opt("DESK_SERVICE_OK_ID"),
                warn: env_opt("DESK_SERVICE_WARN_ID"),
                critical: env_opt("DESK_SERVICE_CRITICAL_ID"),
                unknown: env_opt("DESK_SERVICE_UNKNOWN_ID"),
            },
            ..defaults
        };

        Self { client, tickets }
    }
}

/// Join the monitor URL and site into the prefix of the monitor's relative
/// links. Without a URL, links are passed through unchanged.
pub fn monitor_base_url(url: Option<String>, site: Option<String>) -> Option<String> {
    let url = url.filter(|u| !u.trim().is_empty())?;
    let url = url.trim().trim_end_matches('/');
    match site.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(site) => Some(format!("{url}/{}", site.trim_matches('/'))),
        None => Some(url.to_string()),
    }
}

fn field_names_from_env() -> FieldNames {
    let d = FieldNames::default();
    FieldNames {
        host_name: env_or("DESK_FIELD_HOST_NAME", &d.host_name),
        host_alias: env_or("DESK_FIELD_HOST_ALIAS", &d.host_alias),
        host_ipv4: env_or("DESK_FIELD_HOST_IPV4", &d.host_ipv4),
        host_state: env_or("DESK_FIELD_HOST_STATE", &d.host_state),
        host_output: env_or("DESK_FIELD_HOST_OUTPUT", &d.host_output),
        host_url: env_or("DESK_FIELD_HOST_URL", &d.host_url),
        host_check_command: env_or("DESK_FIELD_HOST_CHECK_COMMAND", &d.host_check_command),
        host_last_state_change: env_or(
            "DESK_FIELD_HOST_LAST_STATE_CHANGE",
            &d.host_last_state_change,
        ),
        host_last_up: env_or("DESK_FIELD_HOST_LAST_UP", &d.host_last_up),
        service_name: env_or("DESK_FIELD_SERVICE_NAME", &d.service_name),
        service_description: env_or("DESK_FIELD_SERVICE_DESCRIPTION", &d.service_description),
        service_state: env_or("DESK_FIELD_SERVICE_STATE", &d.service_state),
        service_output: env_or("DESK_FIELD_SERVICE_OUTPUT", &d.service_output),
        service_output_long: env_or("DESK_FIELD_SERVICE_OUTPUT_LONG", &d.service_output_long),
        service_check_command: env_or(
            "DESK_FIELD_SERVICE_CHECK_COMMAND",
            &d.service_check_command,
        ),
        service_last_state_change: env_or(
            "DESK_FIELD_SERVICE_LAST_STATE_CHANGE",
            &d.service_last_state_change,
        ),
        service_url: env_or("DESK_FIELD_SERVICE_URL", &d.service_url),
        contacts: env_or("DESK_FIELD_CONTACTS", &d.contacts),
        alarm_date: env_or("DESK_FIELD_ALARM_DATE", &d.alarm_date),
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse an env var, falling back to `default` when unset. Panics on an
/// unparsable value so misconfiguration fails at startup.
fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{name} has an invalid value: '{raw}'")),
        Err(_) => default,
    }
}

fn env_opt(name: &str) -> Option<i64> {
    let raw = std::env::var(name).ok()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Some(
        raw.parse()
            .unwrap_or_else(|_| panic!("{name} must be an integer, got '{raw}'")),
    )
}
