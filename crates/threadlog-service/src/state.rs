//! Application state.

use std::sync::Arc;

use threadlog_core::Ledger;
use threadlog_store::MemoryLedger;

use crate::config::{ServiceConfig, StorageBackend};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ledger behind every route.
    pub ledger: Arc<dyn Ledger>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(ledger: Arc<dyn Ledger>, config: ServiceConfig) -> Self {
        Self { ledger, config }
    }
}

/// Open the ledger selected by `config.storage_backend`.
///
/// # Errors
///
/// Returns an error if `RocksDB` cannot be opened, or if it was requested in
/// a build without the `rocksdb-backend` feature.
pub fn open_ledger(config: &ServiceConfig) -> threadlog_store::Result<Arc<dyn Ledger>> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory ledger - records are lost on restart");
            Ok(Arc::new(MemoryLedger::new()))
        }
        StorageBackend::RocksDb => open_rocks(&config.data_dir),
    }
}

#[cfg(feature = "rocksdb-backend")]
fn open_rocks(path: &str) -> threadlog_store::Result<Arc<dyn Ledger>> {
    tracing::info!(path = %path, "Opening RocksDB ledger");
    Ok(Arc::new(threadlog_store::RocksLedger::open(path)?))
}

#[cfg(not(feature = "rocksdb-backend"))]
fn open_rocks(_path: &str) -> threadlog_store::Result<Arc<dyn Ledger>> {
    Err(threadlog_store::StoreError::Database(
        "built without the rocksdb-backend feature".into(),
    ))
}
