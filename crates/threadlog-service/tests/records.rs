//! Record endpoint integration tests.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestHarness;
use threadlog_core::address::{comment_page_address, comment_page_seeds};
use threadlog_core::api::{CreateRecordRequest, RecordEntry};
use threadlog_core::{Address, Comment, CommentPage, ParentRef, ProgramError, Record, RecordKind};

fn page_request(post: &Address, page_index: u64) -> CreateRecordRequest {
    CreateRecordRequest::new(
        RecordKind::CommentPage,
        comment_page_address(post, page_index),
        &comment_page_seeds(post, page_index),
        CommentPage::new(*post, page_index).into(),
    )
}

// =============================================================================
// Fetch
// =============================================================================

#[tokio::test]
async fn unknown_address_is_not_found() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get(&format!("/v1/records/{}", Address::generate()))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn malformed_address_is_bad_request() {
    let harness = TestHarness::new();

    let response = harness.server.get("/v1/records/not-hex").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn created_post_can_be_fetched() {
    let harness = TestHarness::new();
    let post = harness.create_post("rust", "hello").await;

    let response = harness.server.get(&format!("/v1/records/{post}")).await;

    response.assert_status_ok();
    let entry: RecordEntry = response.json();
    assert_eq!(entry.address, post);
    let Record::Post(stored) = entry.record else {
        panic!("expected a post");
    };
    assert_eq!(stored.author, harness.author);
    assert_eq!(stored.topic, "rust");
    assert_eq!(stored.comment_count, 0);
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn list_filters_by_kind() {
    let harness = TestHarness::new();
    harness.create_post("a", "first").await;
    harness.create_post("b", "second").await;

    let posts: Vec<RecordEntry> = harness
        .server
        .get("/v1/records")
        .add_query_param("kind", "post")
        .await
        .json();
    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|e| e.record.kind() == RecordKind::Post));

    let pages: Vec<RecordEntry> = harness
        .server
        .get("/v1/records")
        .add_query_param("kind", "comment_page")
        .await
        .json();
    assert!(pages.is_empty());
}

#[tokio::test]
async fn list_requires_a_known_kind() {
    let harness = TestHarness::new();

    harness
        .server
        .get("/v1/records")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    harness
        .server
        .get("/v1/records")
        .add_query_param("kind", "comment")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn create_page_then_conflict() {
    let harness = TestHarness::new();
    let post = harness.create_post("", "hello").await;
    let request = page_request(&post, 0);

    let response = harness.server.post("/v1/records").json(&request).await;
    response.assert_status(StatusCode::CREATED);
    let entry: RecordEntry = response.json();
    assert_eq!(entry.address, comment_page_address(&post, 0));

    let response = harness.server.post("/v1/records").json(&request).await;
    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "already_exists");
}

#[tokio::test]
async fn create_replies_with_the_stored_page() {
    let harness = TestHarness::new();
    let post = harness.create_post("", "hello").await;
    let mut request = page_request(&post, 0);
    let Record::CommentPage(page) = &mut request.record else {
        panic!("expected a comment page");
    };
    page.comments.push(Comment {
        author: harness.author,
        timestamp: 0,
        parent: ParentRef::Root,
        content: "smuggled".into(),
        like_count: 99,
    });

    let response = harness.server.post("/v1/records").json(&request).await;

    response.assert_status(StatusCode::CREATED);
    let entry: RecordEntry = response.json();
    assert_eq!(entry.record, Record::from(CommentPage::new(post, 0)));

    let stored: RecordEntry = harness
        .server
        .get(&format!("/v1/records/{}", entry.address))
        .await
        .json();
    assert_eq!(stored.record, entry.record);
}

#[tokio::test]
async fn create_at_wrong_address_is_rejected() {
    let harness = TestHarness::new();
    let post = harness.create_post("", "hello").await;
    let mut request = page_request(&post, 0);
    request.address = Address::generate();

    let response = harness.server.post("/v1/records").json(&request).await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "rejected");
    assert_eq!(
        body["error"]["details"]["program_code"],
        ProgramError::AddressMismatch.code()
    );
    assert_eq!(body["error"]["details"]["program_error"], "address_mismatch");
}

#[tokio::test]
async fn create_with_bad_seed_hex_is_bad_request() {
    let harness = TestHarness::new();
    let post = harness.create_post("", "hello").await;
    let mut request = page_request(&post, 0);
    request.seeds = vec!["zz".into()];

    harness
        .server
        .post("/v1/records")
        .json(&request)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_for_missing_post_is_rejected() {
    let harness = TestHarness::new();
    let request = page_request(&Address::generate(), 0);

    let response = harness.server.post("/v1/records").json(&request).await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body["error"]["details"]["program_code"],
        json!(ProgramError::PostNotFound.code())
    );
}

// =============================================================================
// RocksDB backend
// =============================================================================

#[cfg(feature = "rocksdb-backend")]
#[tokio::test]
async fn rocks_backend_serves_records() {
    let harness = TestHarness::rocks();
    let post = harness.create_post("rust", "persisted").await;

    harness
        .server
        .post("/v1/records")
        .json(&page_request(&post, 0))
        .await
        .assert_status(StatusCode::CREATED);

    let pages: Vec<RecordEntry> = harness
        .server
        .get("/v1/records")
        .add_query_param("kind", "comment_page")
        .await
        .json();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].address, comment_page_address(&post, 0));
}
