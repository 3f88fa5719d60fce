//! Threadlog client implementation.

use threadlog_core::{Address, Ledger, Post, Record, RecordKind};

use crate::error::ClientError;

/// Threadlog client over any [`Ledger`].
///
/// Holds no state between calls; every operation reads fresh records.
#[derive(Debug, Clone)]
pub struct Threadlog<L> {
    pub(crate) ledger: L,
}

impl<L: Ledger> Threadlog<L> {
    /// Create a client over `ledger`.
    #[must_use]
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// The underlying ledger.
    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Fetch a record of one kind; `None` if absent.
    pub(crate) async fn fetch_as<T>(
        &self,
        address: &Address,
        expected: RecordKind,
        extract: fn(Record) -> Option<T>,
    ) -> Result<Option<T>, ClientError> {
        let Some(record) = self.ledger.fetch(address).await? else {
            return Ok(None);
        };
        let found = record.kind();
        extract(record)
            .map(Some)
            .ok_or(ClientError::UnexpectedRecord {
                address: *address,
                expected,
                found,
            })
    }

    /// Fetch a post that must exist.
    pub(crate) async fn require_post(&self, address: &Address) -> Result<Post, ClientError> {
        self.fetch_as(address, RecordKind::Post, Record::into_post)
            .await?
            .ok_or(ClientError::NotFound {
                kind: RecordKind::Post,
                address: *address,
            })
    }

    /// Fetch a post; `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger fails or the address holds another kind.
    pub async fn post(&self, address: &Address) -> Result<Option<Post>, ClientError> {
        self.fetch_as(address, RecordKind::Post, Record::into_post)
            .await
    }

    /// Whether any record exists at `address`.
    pub(crate) async fn exists(&self, address: &Address) -> Result<bool, ClientError> {
        Ok(self.ledger.fetch(address).await?.is_some())
    }
}
