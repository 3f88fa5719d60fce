//! Error types for threadlog storage.

use threadlog_core::LedgerError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An index key could not be decoded.
    #[error("corrupt key in {cf}: {len} bytes")]
    CorruptKey {
        /// Column family holding the key.
        cf: &'static str,
        /// Length of the key found.
        len: usize,
    },
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Serialization(msg) => Self::Serialization(msg),
            other => Self::Storage(other.to_string()),
        }
    }
}
