//! Integration tests for the `edit_locks` repository and the Postgres
//! trait implementations.
//!
//! Each test runs against a fresh database with migrations applied by
//! `#[sqlx::test]`.

use copydesk_core::editor::EditorKind;
use copydesk_core::lock::{AcquireOutcome, AcquireRequest, ContentSource, LockStore};
use copydesk_core::protocol::ContentPayload;
use copydesk_db::repositories::EditLockRepo;
use copydesk_db::{PgContentSource, PgLockStore};
use sqlx::PgPool;

fn request(resource: &str, conn: &str, identity: &str) -> AcquireRequest {
    AcquireRequest {
        resource_id: resource.to_string(),
        connection_id: conn.to_string(),
        identity: identity.to_string(),
        editor_kind: EditorKind::Article,
        file_path: None,
    }
}

// ---------------------------------------------------------------------------
// EditLockRepo: conditional-write semantics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn acquire_creates_one_row_per_resource(pool: PgPool) {
    let first = EditLockRepo::acquire(&pool, &request("42", "conn-a", "a@example.com"))
        .await
        .unwrap();
    assert!(first.is_some(), "First acquire should win");

    let second = EditLockRepo::acquire(&pool, &request("42", "conn-b", "b@example.com"))
        .await
        .unwrap();
    assert!(second.is_none(), "Second acquire must not displace the holder");

    let active = EditLockRepo::get_active(&pool, "42").await.unwrap().unwrap();
    assert_eq!(active.holder_connection_id, "conn-a");
    assert_eq!(active.holder_identity, "a@example.com");
    assert_eq!(active.editor_kind, "article");
}

#[sqlx::test(migrations = "./migrations")]
async fn release_is_scoped_to_the_holder_connection(pool: PgPool) {
    EditLockRepo::acquire(&pool, &request("42", "conn-a", "a@example.com"))
        .await
        .unwrap();

    // A different connection cannot release the lock.
    let released = EditLockRepo::release(&pool, "42", "conn-b").await.unwrap();
    assert!(!released);
    assert!(EditLockRepo::get_active(&pool, "42").await.unwrap().is_some());

    // The holder can.
    let released = EditLockRepo::release(&pool, "42", "conn-a").await.unwrap();
    assert!(released);
    assert!(EditLockRepo::get_active(&pool, "42").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn release_on_unlocked_resource_is_noop(pool: PgPool) {
    let released = EditLockRepo::release(&pool, "42", "conn-a").await.unwrap();
    assert!(!released);
}

#[sqlx::test(migrations = "./migrations")]
async fn release_by_connection_sweeps_all_held_locks(pool: PgPool) {
    for resource in ["x", "y", "z"] {
        EditLockRepo::acquire(&pool, &request(resource, "conn-c", "c@example.com"))
            .await
            .unwrap();
    }
    EditLockRepo::acquire(&pool, &request("other", "conn-d", "d@example.com"))
        .await
        .unwrap();

    let mut released = EditLockRepo::release_by_connection(&pool, "conn-c")
        .await
        .unwrap();
    released.sort();
    assert_eq!(released, vec!["x", "y", "z"]);

    // The other connection's lock survives, and a second sweep is empty.
    assert!(EditLockRepo::get_active(&pool, "other").await.unwrap().is_some());
    let again = EditLockRepo::release_by_connection(&pool, "conn-c")
        .await
        .unwrap();
    assert!(again.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn force_release_ignores_holder(pool: PgPool) {
    EditLockRepo::acquire(&pool, &request("42", "conn-a", "a@example.com"))
        .await
        .unwrap();

    assert!(EditLockRepo::force_release(&pool, "42").await.unwrap());
    assert!(EditLockRepo::get_active(&pool, "42").await.unwrap().is_none());
    assert!(!EditLockRepo::force_release(&pool, "42").await.unwrap());
}

// ---------------------------------------------------------------------------
// PgLockStore: trait surface
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn try_acquire_reports_contention_as_held(pool: PgPool) {
    let store = PgLockStore::new(pool);

    let outcome = store
        .try_acquire(&request("42", "conn-a", "a@example.com"))
        .await
        .unwrap();
    assert!(matches!(outcome, AcquireOutcome::Acquired(_)));

    let outcome = store
        .try_acquire(&request("42", "conn-b", "b@example.com"))
        .await
        .unwrap();
    match outcome {
        AcquireOutcome::Held(rec) => {
            assert_eq!(rec.holder_connection_id, "conn-a");
            assert_eq!(rec.editor_kind, EditorKind::Article);
        }
        other => panic!("Expected Held, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn file_lock_round_trips_path(pool: PgPool) {
    let store = PgLockStore::new(pool);

    let outcome = store
        .try_acquire(&AcquireRequest {
            resource_id: "snippets/header.html".to_string(),
            connection_id: "conn-a".to_string(),
            identity: "a@example.com".to_string(),
            editor_kind: EditorKind::File,
            file_path: Some("snippets/header.html".to_string()),
        })
        .await
        .unwrap();

    let rec = outcome.record();
    assert_eq!(rec.editor_kind, EditorKind::File);
    assert_eq!(rec.file_path.as_deref(), Some("snippets/header.html"));

    let fetched = store.get("snippets/header.html").await.unwrap().unwrap();
    assert_eq!(fetched.file_path.as_deref(), Some("snippets/header.html"));
}

// ---------------------------------------------------------------------------
// PgContentSource: adapter dispatch
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn fetch_layout_returns_full_record(pool: PgPool) {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO layouts (name, definition) VALUES ($1, $2) RETURNING id",
    )
    .bind("Two column")
    .bind(serde_json::json!({"columns": 2}))
    .fetch_one(&pool)
    .await
    .unwrap();

    let source = PgContentSource::new(pool);
    let payload = source
        .fetch(&id.to_string(), EditorKind::Layout)
        .await
        .unwrap()
        .expect("Layout should exist");

    match payload {
        ContentPayload::Layout { body } => {
            assert_eq!(body["name"], "Two column");
            assert_eq!(body["definition"]["columns"], 2);
        }
        other => panic!("Expected layout payload, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn fetch_missing_article_is_none(pool: PgPool) {
    let source = PgContentSource::new(pool);
    let payload = source.fetch("999", EditorKind::Article).await.unwrap();
    assert!(payload.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn fetch_rejects_malformed_record_id(pool: PgPool) {
    let source = PgContentSource::new(pool);
    let result = source.fetch("not-a-number", EditorKind::Template).await;
    assert!(result.is_err());
}
