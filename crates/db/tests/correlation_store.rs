//! Integration tests for the correlation store.
//!
//! Exercises the repository layer against a real SQLite database:
//! - Problem insert/upsert and uniqueness
//! - Desk request uniqueness
//! - Link uniqueness and foreign keys
//! - Atomic correlation writes and rollback
//! - Lookups in both directions

use alertdesk_core::problem::Classification;
use alertdesk_db::models::desk_request::CreateDeskRequest;
use alertdesk_db::models::problem::CreateProblem;
use alertdesk_db::repositories::{CorrelationRepo, DeskRequestRepo, LinkRepo, ProblemRepo};
use alertdesk_db::StoreError;
use assert_matches::assert_matches;
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn host_problem(problem_id: &str) -> CreateProblem {
    CreateProblem {
        problem_id: problem_id.to_string(),
        classification: Classification::Host,
        host_name: "web01".to_string(),
        service_check_command: None,
        service_description: None,
        state: Some("DOWN".to_string()),
        acknowledged: false,
        raw_payload: Some(r#"{"hostname":"web01"}"#.to_string()),
    }
}

fn service_problem(problem_id: &str) -> CreateProblem {
    CreateProblem {
        problem_id: problem_id.to_string(),
        classification: Classification::Service,
        host_name: "db01".to_string(),
        service_check_command: Some("check_mk-df".to_string()),
        service_description: Some("Filesystem /var".to_string()),
        state: Some("CRITICAL".to_string()),
        acknowledged: false,
        raw_payload: None,
    }
}

fn desk_request(request_id: i64) -> CreateDeskRequest {
    CreateDeskRequest {
        request_id,
        status: Some("Open".to_string()),
    }
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Problems
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_problem_insert_and_find(pool: SqlitePool) {
    let id = ProblemRepo::insert(&pool, &service_problem("P-10")).await.unwrap();

    let found = ProblemRepo::find_by_problem_id(&pool, "P-10")
        .await
        .unwrap()
        .expect("problem should exist");
    assert_eq!(found.id, id);
    assert_eq!(found.classification, Classification::Service);
    assert_eq!(found.host_name, "db01");
    assert_eq!(found.service_check_command.as_deref(), Some("check_mk-df"));
    assert_eq!(found.service_description.as_deref(), Some("Filesystem /var"));
    assert_eq!(found.state.as_deref(), Some("CRITICAL"));
    assert!(!found.acknowledged);

    assert!(ProblemRepo::exists(&pool, "P-10").await.unwrap());
    assert!(!ProblemRepo::exists(&pool, "P-11").await.unwrap());
    assert!(ProblemRepo::find_by_problem_id(&pool, "P-11").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_problem_is_conflict(pool: SqlitePool) {
    ProblemRepo::insert(&pool, &host_problem("P-1")).await.unwrap();

    let err = ProblemRepo::insert(&pool, &host_problem("P-1")).await.unwrap_err();
    assert_matches!(err, StoreError::Conflict(_));
    assert_eq!(count(&pool, "t_checkmk_problems").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upsert_refreshes_state_and_keeps_id(pool: SqlitePool) {
    let first = ProblemRepo::upsert(&pool, &host_problem("P-1")).await.unwrap();

    let mut again = host_problem("P-1");
    again.state = Some("UNREACH".to_string());
    again.acknowledged = true;
    let second = ProblemRepo::upsert(&pool, &again).await.unwrap();

    assert_eq!(first, second);
    let found = ProblemRepo::find_by_problem_id(&pool, "P-1").await.unwrap().unwrap();
    assert_eq!(found.state.as_deref(), Some("UNREACH"));
    assert!(found.acknowledged);
    assert_eq!(count(&pool, "t_checkmk_problems").await, 1);
}

// ---------------------------------------------------------------------------
// Desk requests and links
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_desk_request_is_conflict(pool: SqlitePool) {
    DeskRequestRepo::insert(&pool, &desk_request(5001)).await.unwrap();

    let err = DeskRequestRepo::insert(&pool, &desk_request(5001)).await.unwrap_err();
    assert!(err.is_conflict());

    let found = DeskRequestRepo::find_by_request_id(&pool, 5001).await.unwrap().unwrap();
    assert_eq!(found.status.as_deref(), Some("Open"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_link_requires_existing_rows(pool: SqlitePool) {
    let problem_ref = ProblemRepo::insert(&pool, &host_problem("P-1")).await.unwrap();

    let err = LinkRepo::insert(&pool, problem_ref, 9999).await.unwrap_err();
    assert_matches!(err, StoreError::Integrity(_));

    let err = LinkRepo::insert(&pool, 9999, 9999).await.unwrap_err();
    assert_matches!(err, StoreError::Integrity(_));
    assert_eq!(count(&pool, "t_problem_request_links").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_problem_links_to_at_most_one_request(pool: SqlitePool) {
    let problem_ref = ProblemRepo::insert(&pool, &host_problem("P-1")).await.unwrap();
    let first = DeskRequestRepo::insert(&pool, &desk_request(5001)).await.unwrap();
    let second = DeskRequestRepo::insert(&pool, &desk_request(5002)).await.unwrap();

    LinkRepo::insert(&pool, problem_ref, first).await.unwrap();

    let err = LinkRepo::insert(&pool, problem_ref, first).await.unwrap_err();
    assert_matches!(err, StoreError::Conflict(_));
    let err = LinkRepo::insert(&pool, problem_ref, second).await.unwrap_err();
    assert_matches!(err, StoreError::Conflict(_));

    let link = LinkRepo::find_by_problem_ref(&pool, problem_ref).await.unwrap().unwrap();
    assert_eq!(link.request_ref, first);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_linked_problem_ids_only_lists_linked(pool: SqlitePool) {
    CorrelationRepo::record(&pool, &host_problem("P-1"), &desk_request(5001))
        .await
        .unwrap();
    CorrelationRepo::record(&pool, &service_problem("P-2"), &desk_request(5002))
        .await
        .unwrap();
    ProblemRepo::insert(&pool, &host_problem("P-3")).await.unwrap();

    let mut ids = LinkRepo::linked_problem_ids(&pool).await.unwrap();
    ids.sort();
    assert_eq!(ids, vec!["P-1".to_string(), "P-2".to_string()]);
}

// ---------------------------------------------------------------------------
// Atomic correlation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_record_writes_all_three_rows(pool: SqlitePool) {
    let correlation = CorrelationRepo::record(&pool, &host_problem("P-100"), &desk_request(5001))
        .await
        .unwrap();

    let link = LinkRepo::find_by_problem_ref(&pool, correlation.problem_ref)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(link.id, correlation.link_id);
    assert_eq!(link.request_ref, correlation.request_ref);

    assert_eq!(
        LinkRepo::find_request_for_problem(&pool, "P-100").await.unwrap(),
        Some(5001)
    );
    assert_eq!(
        LinkRepo::find_request_for_problem(&pool, "P-999").await.unwrap(),
        None
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_record_reuses_unlinked_problem_row(pool: SqlitePool) {
    let existing = ProblemRepo::insert(&pool, &host_problem("P-1")).await.unwrap();

    let correlation = CorrelationRepo::record(&pool, &host_problem("P-1"), &desk_request(5001))
        .await
        .unwrap();

    assert_eq!(correlation.problem_ref, existing);
    assert_eq!(count(&pool, "t_checkmk_problems").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_record_rolls_back_on_conflict(pool: SqlitePool) {
    CorrelationRepo::record(&pool, &host_problem("P-1"), &desk_request(5001))
        .await
        .unwrap();

    // Second ticket for the same problem: the link insert fails, so the
    // desk request insert must be rolled back too.
    let err = CorrelationRepo::record(&pool, &host_problem("P-1"), &desk_request(5002))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Conflict(_));

    assert!(DeskRequestRepo::find_by_request_id(&pool, 5002).await.unwrap().is_none());
    assert_eq!(count(&pool, "t_servicedesk_requests").await, 1);
    assert_eq!(count(&pool, "t_problem_request_links").await, 1);

    // Reusing a desk id for a new problem must not leave the problem behind.
    let err = CorrelationRepo::record(&pool, &host_problem("P-2"), &desk_request(5001))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Conflict(_));
    assert!(!ProblemRepo::exists(&pool, "P-2").await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_records_link_once(pool: SqlitePool) {
    let results = futures::future::join_all((0..4).map(|i| {
        let pool = pool.clone();
        async move {
            CorrelationRepo::record(&pool, &host_problem("P-200"), &desk_request(6000 + i)).await
        }
    }))
    .await;

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one correlation must win: {results:?}");
    for result in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(result.is_conflict(), "losers must see a conflict, got {result:?}");
    }
    assert_eq!(count(&pool, "t_problem_request_links").await, 1);
    assert_eq!(count(&pool, "t_servicedesk_requests").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_find_by_request(pool: SqlitePool) {
    CorrelationRepo::record(&pool, &service_problem("P-7"), &desk_request(7001))
        .await
        .unwrap();

    let found = CorrelationRepo::find_by_request(&pool, 7001)
        .await
        .unwrap()
        .expect("correlation should exist");
    assert_eq!(found.problem_id, "P-7");
    assert_eq!(found.classification, Classification::Service);
    assert_eq!(found.request_status.as_deref(), Some("Open"));
    assert_eq!(found.service_description.as_deref(), Some("Filesystem /var"));

    assert!(CorrelationRepo::find_by_request(&pool, 7002).await.unwrap().is_none());
}
