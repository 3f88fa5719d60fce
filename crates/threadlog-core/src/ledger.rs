//! The ledger contract.
//!
//! Everything threadlog persists goes through a [`Ledger`]: keyed record
//! fetches, a per-kind scan, conditional creation of derived records, and
//! atomic signed mutations. Implementations live in `threadlog-store`
//! (in-process) and `threadlog-client` (HTTP).

use std::sync::Arc;

use async_trait::async_trait;

use crate::address::RecordKind;
use crate::ids::{Address, UserId};
use crate::instruction::Instruction;
use crate::records::Record;

/// Result type for ledger operations.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Errors returned by a [`Ledger`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// `create_and_append` found a record already at the address.
    #[error("record already exists at {address}")]
    AlreadyExists {
        /// The occupied address.
        address: Address,
    },

    /// The ledger program refused the mutation.
    #[error("rejected by ledger program: {0}")]
    Rejected(#[from] ProgramError),

    /// The ledger could not be reached or answered unexpectedly.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backing store failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Rejections raised by the ledger program.
///
/// The numeric codes are stable and travel over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ProgramError {
    /// Content exceeds its length limit.
    #[error("content too long")]
    ContentTooLong,
    /// The target comment page is full.
    #[error("comment page is full")]
    PageFull,
    /// Comment index is beyond the like bitmap.
    #[error("comment index out of bounds")]
    CommentIndexOutOfBounds,
    /// The like was already recorded.
    #[error("already liked")]
    AlreadyLiked,
    /// No comment at the given index.
    #[error("comment not found")]
    CommentNotFound,
    /// Topic exceeds its length limit.
    #[error("topic too long")]
    TopicTooLong,
    /// Content is empty.
    #[error("content is empty")]
    EmptyContent,
    /// The page index no longer matches the post's comment count.
    #[error("page index is stale")]
    StalePage,
    /// Parent index does not name an existing comment.
    #[error("invalid parent comment")]
    InvalidParent,
    /// The post does not exist.
    #[error("post not found")]
    PostNotFound,
    /// The follow was already recorded.
    #[error("already following")]
    AlreadyFollowing,
    /// A user tried to follow themselves.
    #[error("cannot follow self")]
    SelfFollow,
    /// Tip amount was zero.
    #[error("tip amount must be positive")]
    ZeroTip,
    /// The address does not match the derivation of its seeds.
    #[error("address does not match seeds")]
    AddressMismatch,
    /// The account already exists.
    #[error("account already in use")]
    AccountInUse,
    /// The record at an address has a different kind than expected.
    #[error("record kind mismatch")]
    RecordKindMismatch,
}

impl ProgramError {
    /// Every rejection, in code order.
    pub const ALL: [Self; 16] = [
        Self::ContentTooLong,
        Self::PageFull,
        Self::CommentIndexOutOfBounds,
        Self::AlreadyLiked,
        Self::CommentNotFound,
        Self::TopicTooLong,
        Self::EmptyContent,
        Self::StalePage,
        Self::InvalidParent,
        Self::PostNotFound,
        Self::AlreadyFollowing,
        Self::SelfFollow,
        Self::ZeroTip,
        Self::AddressMismatch,
        Self::AccountInUse,
        Self::RecordKindMismatch,
    ];

    const BASE: u32 = 6000;

    /// Stable wire code.
    #[must_use]
    pub const fn code(self) -> u32 {
        Self::BASE + self as u32
    }

    /// Look up a rejection by wire code.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        let offset = code.checked_sub(Self::BASE)?;
        Self::ALL.get(usize::try_from(offset).ok()?).copied()
    }

    /// `snake_case` name used in logs and error bodies.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ContentTooLong => "content_too_long",
            Self::PageFull => "page_full",
            Self::CommentIndexOutOfBounds => "comment_index_out_of_bounds",
            Self::AlreadyLiked => "already_liked",
            Self::CommentNotFound => "comment_not_found",
            Self::TopicTooLong => "topic_too_long",
            Self::EmptyContent => "empty_content",
            Self::StalePage => "stale_page",
            Self::InvalidParent => "invalid_parent",
            Self::PostNotFound => "post_not_found",
            Self::AlreadyFollowing => "already_following",
            Self::SelfFollow => "self_follow",
            Self::ZeroTip => "zero_tip",
            Self::AddressMismatch => "address_mismatch",
            Self::AccountInUse => "account_in_use",
            Self::RecordKindMismatch => "record_kind_mismatch",
        }
    }
}

/// A keyed record store with atomic, program-checked mutations.
#[async_trait]
pub trait Ledger: Send + Sync {
    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetch the record at `address`; `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read.
    async fn fetch(&self, address: &Address) -> LedgerResult<Option<Record>>;

    /// Fetch every record of one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read.
    async fn fetch_all(&self, kind: RecordKind) -> LedgerResult<Vec<(Address, Record)>>;

    // =========================================================================
    // Writes
    // =========================================================================

    /// Create `record` at `address` if nothing is there.
    ///
    /// `address` must equal `derive_address(kind, seeds)`. Creating a comment
    /// page also points its post's `last_comment_page` at it, in the same
    /// atomic write.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AlreadyExists`] if the address is occupied.
    /// - [`LedgerError::Rejected`] if the address, kind or page index is wrong.
    async fn create_and_append(
        &self,
        kind: RecordKind,
        address: &Address,
        seeds: &[Vec<u8>],
        record: Record,
    ) -> LedgerResult<()>;

    /// Apply a signed mutation atomically.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Rejected`] if the program refuses it.
    async fn submit_mutation(&self, instruction: Instruction, signer: &UserId) -> LedgerResult<()>;
}

#[async_trait]
impl<L: Ledger + ?Sized> Ledger for Arc<L> {
    async fn fetch(&self, address: &Address) -> LedgerResult<Option<Record>> {
        (**self).fetch(address).await
    }

    async fn fetch_all(&self, kind: RecordKind) -> LedgerResult<Vec<(Address, Record)>> {
        (**self).fetch_all(kind).await
    }

    async fn create_and_append(
        &self,
        kind: RecordKind,
        address: &Address,
        seeds: &[Vec<u8>],
        record: Record,
    ) -> LedgerResult<()> {
        (**self).create_and_append(kind, address, seeds, record).await
    }

    async fn submit_mutation(&self, instruction: Instruction, signer: &UserId) -> LedgerResult<()> {
        (**self).submit_mutation(instruction, signer).await
    }
}
