//! The client SDK driving a live node over HTTP.

use std::sync::Arc;

use threadlog_client::{ClientError, HttpLedger, Threadlog};
use threadlog_core::{DuplicateInteraction, ParentRef, UserId};
use threadlog_service::{create_router, AppState, ServiceConfig, StorageBackend};
use threadlog_store::MemoryLedger;

async fn spawn_node() -> String {
    let config = ServiceConfig {
        storage_backend: StorageBackend::Memory,
        ..ServiceConfig::default()
    };
    let app = create_router(AppState::new(Arc::new(MemoryLedger::new()), config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn comments_cross_a_page_boundary_over_http() {
    let client = Threadlog::new(HttpLedger::new(spawn_node().await).unwrap());
    let author = UserId::generate();

    let post = client.create_post(&author, "rust", "hello").await.unwrap();
    let first = client
        .add_comment(&post, &author, "root", ParentRef::Root)
        .await
        .unwrap();
    for i in 1..12 {
        let index = client
            .add_comment(&post, &author, &format!("reply {i}"), ParentRef::Parent(first))
            .await
            .unwrap();
        assert_eq!(index, i);
    }

    let view = client.read_thread(&post).await.unwrap();
    assert!(view.is_complete());
    assert_eq!(view.post.comment_count, 12);
    assert_eq!(view.post.total_pages(), 2);
    assert_eq!(view.forest.roots().len(), 1);
    assert_eq!(view.forest.len(), 12);
}

#[tokio::test]
async fn duplicate_like_maps_back_to_client_error() {
    let client = Threadlog::new(HttpLedger::new(spawn_node().await).unwrap());
    let author = UserId::generate();
    let viewer = UserId::generate();

    let post = client.create_post(&author, "", "hello").await.unwrap();
    let index = client
        .add_comment(&post, &author, "like me", ParentRef::Root)
        .await
        .unwrap();

    client.like_comment(&viewer, &post, index).await.unwrap();
    let err = client
        .like_comment(&viewer, &post, index)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Duplicate(DuplicateInteraction::CommentLiked { .. })
    ));

    let state = client.interaction_state(&viewer, &post).await.unwrap();
    assert!(state.comment_likes.is_set(index));
    assert!(!state.liked_post);
}
