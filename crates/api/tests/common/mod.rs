#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use alertdesk_api::auth::token::hash_token;
use alertdesk_api::config::ServerConfig;
use alertdesk_api::engine::{CorrelationEngine, ProblemCache};
use alertdesk_api::router::build_app_router;
use alertdesk_api::state::AppState;
use alertdesk_core::monitor::HostNotification;
use alertdesk_core::problem::ProblemEvent;
use alertdesk_core::ticket::{TicketDraft, TicketSettings};
use alertdesk_desk::{CreatedRequest, DeskClient, DeskError, DeskErrorKind};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

/// Bearer token accepted by the test app.
pub const TEST_TOKEN: &str = "test-monitor-token";

pub const HOST_TEMPLATE_ID: i64 = 301;
pub const SERVICE_TEMPLATE_ID: i64 = 302;

// ---------------------------------------------------------------------------
// Fake desk
// ---------------------------------------------------------------------------

/// In-process desk that hands out sequential ids starting at 5001.
pub struct FakeDesk {
    next_id: AtomicI64,
    calls: AtomicUsize,
    delay: Duration,
    failure: Mutex<Option<DeskErrorKind>>,
    templates: Mutex<Vec<i64>>,
}

impl FakeDesk {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    /// A desk that takes `delay` to answer each call.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            next_id: AtomicI64::new(5001),
            calls: AtomicUsize::new(0),
            delay,
            failure: Mutex::new(None),
            templates: Mutex::new(Vec::new()),
        }
    }

    /// Make every following call fail with `kind` (or succeed again with `None`).
    pub fn fail_with(&self, kind: Option<DeskErrorKind>) {
        *self.failure.lock().unwrap() = kind;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn templates(&self) -> Vec<i64> {
        self.templates.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeskClient for FakeDesk {
    async fn create_request(
        &self,
        template_id: i64,
        _ticket: &TicketDraft,
    ) -> Result<CreatedRequest, DeskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.templates.lock().unwrap().push(template_id);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let failure = *self.failure.lock().unwrap();
        match failure {
            Some(DeskErrorKind::Authentication) => Err(DeskError::Authentication {
                status: 401,
                body: "invalid authtoken".into(),
            }),
            Some(DeskErrorKind::Validation) => Err(DeskError::Validation {
                status: 422,
                body: "mandatory field missing".into(),
            }),
            Some(DeskErrorKind::Transient) => Err(DeskError::HttpStatus {
                status: 503,
                body: "maintenance".into(),
            }),
            None => Ok(CreatedRequest {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                status: Some("Open".into()),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine / app builders
// ---------------------------------------------------------------------------

pub fn ticket_settings() -> TicketSettings {
    TicketSettings {
        host_template_id: HOST_TEMPLATE_ID,
        service_template_id: SERVICE_TEMPLATE_ID,
        monitor_base_url: Some("https://monitor.example.com/prod".into()),
        ..Default::default()
    }
}

/// Build an engine over `pool` with an empty cache.
pub fn build_engine(
    pool: SqlitePool,
    desk: Arc<FakeDesk>,
    desk_timeout: Duration,
) -> CorrelationEngine {
    CorrelationEngine::new(
        pool,
        Arc::new(ProblemCache::new()),
        desk,
        ticket_settings(),
        desk_timeout,
    )
}

/// Argon2 hash of [`TEST_TOKEN`], computed once per test binary.
fn token_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_token(TEST_TOKEN).unwrap()).clone()
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 5,
        token_hash: token_hash(),
        cache_refresh_secs: 0,
    }
}

/// Build the full application router over `pool`, backed by `desk`.
pub fn build_test_app_with(pool: SqlitePool, desk: Arc<FakeDesk>) -> Router {
    let config = test_config();
    let engine = Arc::new(build_engine(pool.clone(), desk, Duration::from_secs(5)));
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cache: Arc::clone(engine.cache()),
        engine,
    };
    build_app_router(state, &config)
}

/// Build the full application router with a fresh fake desk.
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_test_app_with(pool, Arc::new(FakeDesk::new()))
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Host notification payload in the monitor's own key format.
pub fn host_payload(problem_id: &str, host: &str, state: &str) -> Value {
    serde_json::json!({
        "NOTIFY_HOSTPROBLEMID": problem_id,
        "NOTIFY_HOSTNAME": host,
        "NOTIFY_HOSTSTATE": state,
        "NOTIFY_HOSTOUTPUT": "PING CRITICAL - Packet loss = 100%",
        "NOTIFY_HOSTURL": "/check_mk/index.py?start_url=view.py%3Fview_name%3Dhoststatus",
        "NOTIFY_NOTIFICATIONTYPE": "PROBLEM",
        "NOTIFY_LONGDATETIME": "Mon Oct 20 10:00:00 CEST 2025",
        "NOTIFY_CONTACTS": "ops",
    })
}

/// Service notification payload with snake_case keys.
pub fn service_payload(problem_id: &str, host: &str, service: &str, state: &str) -> Value {
    serde_json::json!({
        "service_problem_id": problem_id,
        "host_name": host,
        "service_desc": service,
        "service_state": state,
        "service_check_command": "check_mk-df",
        "service_output": "97% used",
        "notification_type": "PROBLEM",
        "notification_datetime": "1760947200",
    })
}

/// A host problem event as the engine receives it.
pub fn host_event(problem_id: &str, host: &str) -> ProblemEvent {
    host_event_from(host_payload(problem_id, host, "DOWN"))
}

/// Parse a host payload into an event.
pub fn host_event_from(raw: Value) -> ProblemEvent {
    let notification: HostNotification = serde_json::from_value(raw.clone()).unwrap();
    notification.into_problem_event(raw).unwrap()
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {TEST_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a JSON body with the given bearer token (`None` sends no header).
pub async fn post_json(app: Router, uri: &str, token: Option<&str>, body: &Value) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a JSON body with the test token.
pub async fn post_auth(app: Router, uri: &str, body: &Value) -> Response<Body> {
    post_json(app, uri, Some(TEST_TOKEN), body).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}
