//! Common test utilities for threadlog client tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use threadlog_client::Threadlog;
use threadlog_core::{Address, ParentRef, UserId};
use threadlog_store::MemoryLedger;

/// Test harness: a client over a fresh in-memory ledger.
pub struct TestHarness {
    /// Client under test.
    pub client: Threadlog<Arc<MemoryLedger>>,
    /// The ledger, for fault injection and direct inspection.
    pub ledger: Arc<MemoryLedger>,
    /// Author of posts created through the harness.
    pub author: UserId,
}

impl TestHarness {
    /// Create a new harness with an empty ledger.
    pub fn new() -> Self {
        let ledger = Arc::new(MemoryLedger::new());
        Self {
            client: Threadlog::new(Arc::clone(&ledger)),
            ledger,
            author: UserId::generate(),
        }
    }

    /// Create a post by the harness author.
    pub async fn post(&self) -> Address {
        self.client
            .create_post(&self.author, "testing", "a post")
            .await
            .expect("Failed to create post")
    }

    /// Append `count` root comments by the harness author.
    pub async fn comments(&self, post: &Address, count: u64) {
        for i in 0..count {
            self.client
                .add_comment(post, &self.author, &format!("comment {i}"), ParentRef::Root)
                .await
                .expect("Failed to add comment");
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
