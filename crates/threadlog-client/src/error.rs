//! Client error types.

use threadlog_core::{
    Address, CapacityError, DuplicateInteraction, LedgerError, RecordKind, ValidationError,
};

/// Errors that can occur when using the threadlog client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Input rejected before contacting the ledger.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A page or bitmap has no room.
    #[error("capacity exceeded: {0}")]
    Capacity(#[from] CapacityError),

    /// The interaction was already recorded.
    #[error("duplicate interaction: {0}")]
    Duplicate(#[from] DuplicateInteraction),

    /// A required record is absent.
    #[error("{kind} not found at {address}")]
    NotFound {
        /// Expected record kind.
        kind: RecordKind,
        /// Address looked up.
        address: Address,
    },

    /// The address holds a record of another kind.
    #[error("expected {expected} at {address}, found {found}")]
    UnexpectedRecord {
        /// Address looked up.
        address: Address,
        /// Expected record kind.
        expected: RecordKind,
        /// Kind actually stored.
        found: RecordKind,
    },

    /// The ledger failed or refused the operation.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The HTTP client could not be built.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
