//! Error types for threadlog.
//!
//! These are the errors a client can raise without asking the ledger. What
//! the ledger itself rejects lives in [`crate::ledger::ProgramError`].

use crate::ids::{Address, UserId};

/// Input rejected before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Post topic exceeds the limit.
    #[error("topic is {len} bytes, maximum is {max}")]
    TopicTooLong {
        /// Length supplied.
        len: usize,
        /// Limit.
        max: usize,
    },

    /// Post or comment content exceeds the limit.
    #[error("content is {len} bytes, maximum is {max}")]
    ContentTooLong {
        /// Length supplied.
        len: usize,
        /// Limit.
        max: usize,
    },

    /// Post content is empty.
    #[error("content must not be empty")]
    EmptyContent,

    /// A reply names a comment that does not exist yet.
    #[error("parent comment {parent} does not exist (post has {comment_count} comments)")]
    InvalidParent {
        /// Requested parent index.
        parent: u64,
        /// Comments on the post at the time of the check.
        comment_count: u64,
    },

    /// Users cannot follow themselves.
    #[error("a user cannot follow themselves")]
    SelfFollow,

    /// Tips must transfer a positive amount.
    #[error("tip amount must be positive")]
    ZeroTip,
}

/// A bounded structure has no room for the requested write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapacityError {
    /// The comment page already holds `PAGE_SIZE` comments.
    #[error("comment page {page_index} is full")]
    PageFull {
        /// Page that was targeted.
        page_index: u64,
    },

    /// The like bitmap cannot track this comment index.
    #[error("comment index {index} is beyond like-tracking capacity {capacity}")]
    BitmapIndexOutOfRange {
        /// Requested global index.
        index: u64,
        /// Number of trackable indices.
        capacity: u64,
    },
}

/// The interaction was already recorded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DuplicateInteraction {
    /// The user already liked this post.
    #[error("post {post} already liked")]
    PostLiked {
        /// The post.
        post: Address,
    },

    /// The user already liked this comment.
    #[error("comment {global_index} on post {post} already liked")]
    CommentLiked {
        /// The post.
        post: Address,
        /// Global index of the comment.
        global_index: u64,
    },

    /// The follower already follows the target.
    #[error("already following {target}")]
    AlreadyFollowing {
        /// The followed user.
        target: UserId,
    },

    /// The profile was already created.
    #[error("profile for {owner} already exists")]
    ProfileExists {
        /// Profile owner.
        owner: UserId,
    },
}
