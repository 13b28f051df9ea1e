//! Integration tests for health, ping, correlation lookup and cache refresh.

mod common;

use alertdesk_db::models::desk_request::CreateDeskRequest;
use alertdesk_db::models::problem::CreateProblem;
use alertdesk_db::repositories::CorrelationRepo;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, build_test_app, get, get_auth, host_event, post_auth, post_json};
use serde_json::json;
use sqlx::SqlitePool;
use tower::ServiceExt;

async fn seed_correlation(pool: &SqlitePool, problem_id: &str, request_id: i64) {
    CorrelationRepo::record(
        pool,
        &CreateProblem::from(&host_event(problem_id, "web01")),
        &CreateDeskRequest {
            request_id,
            status: Some("Open".into()),
        },
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../db/migrations")]
async fn health_check_returns_ok_without_auth(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["cached_problems"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn response_contains_x_request_id_header(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = get(app, "/health").await;

    assert!(response.headers().get("x-request-id").is_some());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn caller_request_id_is_echoed(pool: SqlitePool) {
    let app = build_test_app(pool);
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "monitor-42")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "monitor-42");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_route_returns_404(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn ping_requires_token(pool: SqlitePool) {
    let app = build_test_app(pool);

    let response = get(app.clone(), "/api/v1/ping").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/api/v1/ping").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["message"], "pong");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn correlation_lookup_by_request_id(pool: SqlitePool) {
    seed_correlation(&pool, "P-42", 8042).await;
    let app = build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/correlations/8042").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["request_id"], 8042);
    assert_eq!(json["data"]["problem_id"], "P-42");
    assert_eq!(json["data"]["classification"], "host");
    assert_eq!(json["data"]["host_name"], "web01");

    let response = get_auth(app, "/api/v1/correlations/8043").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cache_refresh_loads_links_from_store(pool: SqlitePool) {
    let app = build_test_app(pool.clone());
    seed_correlation(&pool, "P-1", 9001).await;
    seed_correlation(&pool, "P-2", 9002).await;

    let response = post_json(app.clone(), "/api/v1/cache/refresh", None, &json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_auth(app.clone(), "/api/v1/cache/refresh", &json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["cached"], 2);

    let json = body_json(get(app, "/health").await).await;
    assert_eq!(json["cached_problems"], 2);
}
