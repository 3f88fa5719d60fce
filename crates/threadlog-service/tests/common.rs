//! Common test utilities for threadlog service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::{TestResponse, TestServer};
use tempfile::TempDir;

use threadlog_core::api::SIGNER_HEADER;
use threadlog_core::{Address, Instruction, Ledger, UserId};
use threadlog_service::{create_router, AppState, ServiceConfig, StorageBackend};
use threadlog_store::MemoryLedger;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: Option<TempDir>,
    /// A user to sign mutations with.
    pub author: UserId,
}

impl TestHarness {
    /// Harness over an in-memory ledger.
    pub fn new() -> Self {
        let config = test_config(StorageBackend::Memory, "unused".into());
        Self::with_ledger(Arc::new(MemoryLedger::new()), config, None)
    }

    /// Harness over a `RocksDB` ledger in a fresh temp directory.
    #[cfg(feature = "rocksdb-backend")]
    pub fn rocks() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let ledger =
            threadlog_store::RocksLedger::open(temp_dir.path()).expect("Failed to open ledger");
        let config = test_config(
            StorageBackend::RocksDb,
            temp_dir.path().to_string_lossy().to_string(),
        );
        Self::with_ledger(Arc::new(ledger), config, Some(temp_dir))
    }

    fn with_ledger(ledger: Arc<dyn Ledger>, config: ServiceConfig, temp_dir: Option<TempDir>) -> Self {
        let state = AppState::new(ledger, config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
            author: UserId::generate(),
        }
    }

    /// Submit an instruction signed by `signer`.
    pub async fn submit(&self, signer: &UserId, instruction: &Instruction) -> TestResponse {
        self.server
            .post("/v1/mutations")
            .add_header(SIGNER_HEADER, signer.to_string())
            .json(instruction)
            .await
    }

    /// Submit an instruction signed by `signer`, asserting success.
    pub async fn mutate(&self, signer: &UserId, instruction: Instruction) {
        self.submit(signer, &instruction).await.assert_status_ok();
    }

    /// Create a post by the harness author and return its address.
    pub async fn create_post(&self, topic: &str, content: &str) -> Address {
        let post = Address::generate();
        self.mutate(
            &self.author,
            Instruction::CreatePost {
                post,
                topic: topic.into(),
                content: content.into(),
            },
        )
        .await;
        post
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn test_config(storage_backend: StorageBackend, data_dir: String) -> ServiceConfig {
    ServiceConfig {
        listen_addr: "127.0.0.1:0".into(),
        data_dir,
        storage_backend,
        cors_origins: vec!["*".into()],
        max_body_bytes: 64 * 1024,
        request_timeout_seconds: 30,
    }
}
