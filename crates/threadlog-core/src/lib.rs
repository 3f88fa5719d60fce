//! Core types for threadlog, a paginated comment log kept on a ledger.
//!
//! This crate is pure: it holds no I/O and talks to storage only through the
//! [`Ledger`] trait.
//!
//! - **Identifiers**: `UserId`, `Address`
//! - **Addressing**: `RecordKind`, `derive_address` and the per-kind seed helpers
//! - **Records**: `Post`, `CommentPage`, `Comment`, interaction markers, `UserProfile`
//! - **Paging**: `PAGE_SIZE` and page/index arithmetic
//! - **Threads**: `build_forest`, turning a flat comment list into reply trees
//! - **Likes**: `LikeBitmap` and the `CommentLikeTracker` state machine
//! - **Ledger**: the `Ledger` trait, `Instruction`, `ProgramError`
//! - **API**: JSON bodies shared by the HTTP service and client
//!
//! # Paging
//!
//! Comments on a post are appended to fixed-size pages of [`PAGE_SIZE`]. A
//! comment's identity is its global index `page * PAGE_SIZE + offset`, which
//! is also the bit it occupies in a viewer's like bitmap.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod address;
pub mod api;
pub mod bitmap;
pub mod error;
pub mod ids;
pub mod instruction;
pub mod interaction;
pub mod ledger;
pub mod pager;
pub mod records;
pub mod thread;
pub mod validation;

pub use address::{derive_address, AddressError, RecordKind, MAX_SEEDS, MAX_SEED_LEN};
pub use bitmap::{BitmapError, LikeBitmap, BITMAP_BYTES, BITMAP_CAPACITY};
pub use error::{CapacityError, DuplicateInteraction, ValidationError};
pub use ids::{Address, IdError, UserId, ADDRESS_LEN};
pub use instruction::Instruction;
pub use interaction::{CommentLikeTracker, LikeState};
pub use ledger::{Ledger, LedgerError, LedgerResult, ProgramError};
pub use pager::PAGE_SIZE;
pub use records::{
    Comment, CommentPage, IndexedComment, ParentRef, Post, Record, UserCommentLikes, UserFollow,
    UserLike, UserProfile, ROOT_SENTINEL,
};
pub use thread::{build_forest, ThreadForest, ThreadNode};
pub use validation::{
    validate_comment, validate_post, MAX_COMMENT_LEN, MAX_POST_CONTENT_LEN, MAX_TOPIC_LEN,
};
