//! Comment write path and thread reading tests.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use common::TestHarness;
use threadlog_client::{ClientError, Threadlog};
use threadlog_core::address::{comment_page_address, comment_page_seeds};
use threadlog_core::{
    Address, CommentPage, Instruction, Ledger, LedgerError, LedgerResult, ParentRef, ProgramError,
    Record, RecordKind, UserId, ValidationError,
};
use threadlog_store::MemoryLedger;

/// Ledger that lets another writer append a comment just before the next
/// `AddComment` it forwards.
struct RacingLedger {
    inner: Arc<MemoryLedger>,
    rival: UserId,
    armed: AtomicBool,
}

#[async_trait]
impl Ledger for RacingLedger {
    async fn fetch(&self, address: &Address) -> LedgerResult<Option<Record>> {
        self.inner.fetch(address).await
    }

    async fn fetch_all(&self, kind: RecordKind) -> LedgerResult<Vec<(Address, Record)>> {
        self.inner.fetch_all(kind).await
    }

    async fn create_and_append(
        &self,
        kind: RecordKind,
        address: &Address,
        seeds: &[Vec<u8>],
        record: Record,
    ) -> LedgerResult<()> {
        self.inner
            .create_and_append(kind, address, seeds, record)
            .await
    }

    async fn submit_mutation(&self, instruction: Instruction, signer: &UserId) -> LedgerResult<()> {
        if let Instruction::AddComment {
            post,
            page_index,
            global_index,
            parent_index,
            ..
        } = &instruction
        {
            if self.armed.swap(false, Ordering::SeqCst) {
                let rival = Instruction::AddComment {
                    post: *post,
                    page_index: *page_index,
                    global_index: *global_index,
                    content: "rival".into(),
                    parent_index: *parent_index,
                };
                self.inner.submit_mutation(rival, &self.rival).await?;
            }
        }
        self.inner.submit_mutation(instruction, signer).await
    }
}

// ============================================================================
// Appending
// ============================================================================

#[tokio::test]
async fn comments_get_sequential_global_indices() {
    let harness = TestHarness::new();
    let post = harness.post().await;

    for expected in 0..12 {
        let index = harness
            .client
            .add_comment(&post, &harness.author, "hi", ParentRef::Root)
            .await
            .unwrap();
        assert_eq!(index, expected);
    }

    let stored = harness.client.post(&post).await.unwrap().unwrap();
    assert_eq!(stored.comment_count, 12);
    assert_eq!(stored.last_comment_page, Some(comment_page_address(&post, 1)));
}

#[tokio::test]
async fn twenty_five_comments_span_three_pages() {
    let harness = TestHarness::new();
    let post = harness.post().await;
    harness.comments(&post, 25).await;

    for (page_index, expected) in [(0, 10), (1, 10), (2, 5)] {
        let page = harness
            .client
            .comment_page(&post, page_index)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(page.comments.len(), expected);
    }
    assert!(harness.client.comment_page(&post, 3).await.unwrap().is_none());

    let view = harness.client.read_thread(&post).await.unwrap();
    assert!(view.is_complete());
    let indices: Vec<_> = view.forest.roots().iter().map(|n| n.global_index).collect();
    assert_eq!(indices, (0..25).collect::<Vec<_>>());
    assert_eq!(view.forest.find(23).unwrap().comment.content, "comment 23");
}

#[tokio::test]
async fn invalid_content_is_rejected_before_the_ledger() {
    let harness = TestHarness::new();
    let post = harness.post().await;
    let records_before = harness.ledger.len().await;

    let too_long = "x".repeat(101);
    let result = harness
        .client
        .add_comment(&post, &harness.author, &too_long, ParentRef::Root)
        .await;
    assert!(matches!(
        result,
        Err(ClientError::Validation(ValidationError::ContentTooLong { len: 101, max: 100 }))
    ));

    let result = harness
        .client
        .add_comment(&post, &harness.author, "", ParentRef::Root)
        .await;
    assert!(matches!(
        result,
        Err(ClientError::Validation(ValidationError::EmptyContent))
    ));

    assert_eq!(harness.ledger.len().await, records_before);
}

#[tokio::test]
async fn reply_to_future_comment_is_rejected() {
    let harness = TestHarness::new();
    let post = harness.post().await;
    harness.comments(&post, 2).await;

    let result = harness
        .client
        .add_comment(&post, &harness.author, "reply", ParentRef::Parent(2))
        .await;
    assert!(matches!(
        result,
        Err(ClientError::Validation(ValidationError::InvalidParent {
            parent: 2,
            comment_count: 2
        }))
    ));
}

#[tokio::test]
async fn comment_on_missing_post_is_not_found() {
    let harness = TestHarness::new();
    let missing = Address::generate();

    let result = harness
        .client
        .add_comment(&missing, &harness.author, "hello?", ParentRef::Root)
        .await;
    assert!(matches!(
        result,
        Err(ClientError::NotFound {
            kind: RecordKind::Post,
            ..
        })
    ));
}

#[tokio::test]
async fn page_created_by_another_writer_is_reused() {
    let harness = TestHarness::new();
    let post = harness.post().await;
    harness.comments(&post, 10).await;

    // Another writer wins the race to open page 1
    harness
        .ledger
        .create_and_append(
            RecordKind::CommentPage,
            &comment_page_address(&post, 1),
            &comment_page_seeds(&post, 1),
            CommentPage::new(post, 1).into(),
        )
        .await
        .unwrap();

    let index = harness
        .client
        .add_comment(&post, &harness.author, "eleventh", ParentRef::Root)
        .await
        .unwrap();
    assert_eq!(index, 10);
}

/// Ledger whose comment pages all claim to be page 0.
struct MislabeledPages {
    inner: Arc<MemoryLedger>,
}

#[async_trait]
impl Ledger for MislabeledPages {
    async fn fetch(&self, address: &Address) -> LedgerResult<Option<Record>> {
        Ok(self.inner.fetch(address).await?.map(|record| match record {
            Record::CommentPage(mut page) => {
                page.page_index = 0;
                Record::CommentPage(page)
            }
            other => other,
        }))
    }

    async fn fetch_all(&self, kind: RecordKind) -> LedgerResult<Vec<(Address, Record)>> {
        self.inner.fetch_all(kind).await
    }

    async fn create_and_append(
        &self,
        kind: RecordKind,
        address: &Address,
        seeds: &[Vec<u8>],
        record: Record,
    ) -> LedgerResult<()> {
        self.inner
            .create_and_append(kind, address, seeds, record)
            .await
    }

    async fn submit_mutation(&self, instruction: Instruction, signer: &UserId) -> LedgerResult<()> {
        self.inner.submit_mutation(instruction, signer).await
    }
}

#[tokio::test]
async fn concurrent_append_never_reports_a_foreign_index() {
    let harness = TestHarness::new();
    let post = harness.post().await;
    harness.comments(&post, 1).await;

    let racy = Threadlog::new(RacingLedger {
        inner: Arc::clone(&harness.ledger),
        rival: UserId::generate(),
        armed: AtomicBool::new(true),
    });

    let result = racy
        .add_comment(&post, &harness.author, "mine", ParentRef::Root)
        .await;
    assert!(matches!(
        result,
        Err(ClientError::Ledger(LedgerError::Rejected(ProgramError::StalePage)))
    ));

    let view = harness.client.read_thread(&post).await.unwrap();
    assert_eq!(view.forest.len(), 2);
    assert_eq!(view.forest.find(1).unwrap().comment.content, "rival");

    // A retry re-reads the count and gets the next free index.
    let index = racy
        .add_comment(&post, &harness.author, "mine", ParentRef::Root)
        .await
        .unwrap();
    assert_eq!(index, 2);
    let view = harness.client.read_thread(&post).await.unwrap();
    assert_eq!(view.forest.find(2).unwrap().comment.content, "mine");
}

#[tokio::test]
async fn stale_page_surfaces_as_ledger_rejection() {
    let harness = TestHarness::new();
    let post = harness.post().await;
    harness.comments(&post, 1).await;

    let result = harness
        .ledger
        .submit_mutation(
            threadlog_core::Instruction::AddComment {
                post,
                page_index: 1,
                global_index: 1,
                content: "wrong page".into(),
                parent_index: ParentRef::Root,
            },
            &UserId::generate(),
        )
        .await;
    assert_eq!(result, Err(LedgerError::Rejected(ProgramError::StalePage)));
}

// ============================================================================
// Reading
// ============================================================================

#[tokio::test]
async fn indices_follow_the_fetched_page_not_the_stored_label() {
    let harness = TestHarness::new();
    let post = harness.post().await;
    harness.comments(&post, 15).await;

    let reader = Threadlog::new(MislabeledPages {
        inner: Arc::clone(&harness.ledger),
    });
    let view = reader.read_thread(&post).await.unwrap();

    let mut indices: Vec<u64> = view.forest.iter().map(|(_, node)| node.global_index).collect();
    indices.sort_unstable();
    assert_eq!(indices, (0..15).collect::<Vec<_>>());
    assert_eq!(view.forest.find(12).unwrap().comment.content, "comment 12");
}

#[tokio::test]
async fn post_without_comments_reads_empty() {
    let harness = TestHarness::new();
    let post = harness.post().await;

    let view = harness.client.read_thread(&post).await.unwrap();
    assert!(view.forest.is_empty());
    assert!(view.missing_pages.is_empty());
}

#[tokio::test]
async fn replies_nest_under_parents() {
    let harness = TestHarness::new();
    let post = harness.post().await;
    harness.comments(&post, 5).await;

    let a = harness
        .client
        .add_comment(&post, &harness.author, "A", ParentRef::Root)
        .await
        .unwrap();
    harness.comments(&post, 6).await;
    let b = harness
        .client
        .add_comment(&post, &harness.author, "B", ParentRef::Parent(a))
        .await
        .unwrap();
    assert_eq!((a, b), (5, 12));

    let view = harness.client.read_thread(&post).await.unwrap();
    let node = view.forest.find(5).unwrap();
    assert_eq!(node.comment.content, "A");
    assert_eq!(node.replies.len(), 1);
    assert_eq!(node.replies[0].global_index, 12);
    assert_eq!(node.replies[0].comment.content, "B");
    assert_eq!(view.forest.len(), 13);
}

#[tokio::test]
async fn failed_page_becomes_missing_and_orphans_replies() {
    let harness = TestHarness::new();
    let post = harness.post().await;
    harness.comments(&post, 10).await;
    harness
        .client
        .add_comment(&post, &harness.author, "reply", ParentRef::Parent(3))
        .await
        .unwrap();

    harness
        .ledger
        .make_unavailable(comment_page_address(&post, 0))
        .await;

    let view = harness.client.read_thread(&post).await.unwrap();
    assert_eq!(view.missing_pages, vec![0]);
    assert_eq!(view.forest.len(), 1);
    let orphan = &view.forest.roots()[0];
    assert_eq!(orphan.global_index, 10);
    assert!(orphan.orphaned);
}

#[tokio::test]
async fn reading_twice_gives_the_same_threads() {
    let harness = TestHarness::new();
    let post = harness.post().await;
    harness.comments(&post, 3).await;
    harness
        .client
        .add_comment(&post, &harness.author, "reply", ParentRef::Parent(1))
        .await
        .unwrap();

    let first = harness.client.read_thread(&post).await.unwrap();
    let second = harness.client.read_thread(&post).await.unwrap();
    assert_eq!(first.forest, second.forest);
}
