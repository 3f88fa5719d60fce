//! Mutations a signer can submit to the ledger.

use serde::{Deserialize, Serialize};

use crate::ids::{Address, UserId};
use crate::records::ParentRef;

/// A ledger mutation. The signer is supplied alongside, never inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instruction {
    /// Create a post at a freshly generated address.
    CreatePost {
        /// Address for the new post.
        post: Address,
        /// Topic, possibly empty.
        topic: String,
        /// Body text.
        content: String,
    },

    /// Append a comment to the post's current page.
    AddComment {
        /// Post being commented on.
        post: Address,
        /// Page the client expects to append to.
        page_index: u64,
        /// Global index the client expects the comment to receive. The
        /// ledger refuses the append if the post has moved past it.
        global_index: u64,
        /// Comment text.
        content: String,
        /// Replied-to comment, or root.
        parent_index: ParentRef,
    },

    /// Like a post once.
    LikePost {
        /// Liked post.
        post: Address,
    },

    /// Like a comment once.
    LikeComment {
        /// Post holding the comment.
        post: Address,
        /// Global index of the comment.
        global_index: u64,
    },

    /// Tip a post's author.
    TipPost {
        /// Tipped post.
        post: Address,
        /// Amount in the smallest currency unit.
        amount: u64,
    },

    /// Follow another user.
    FollowUser {
        /// User to follow.
        target: UserId,
    },

    /// Create the signer's profile.
    CreateProfile,
}

impl Instruction {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreatePost { .. } => "create_post",
            Self::AddComment { .. } => "add_comment",
            Self::LikePost { .. } => "like_post",
            Self::LikeComment { .. } => "like_comment",
            Self::TipPost { .. } => "tip_post",
            Self::FollowUser { .. } => "follow_user",
            Self::CreateProfile => "create_profile",
        }
    }
}
