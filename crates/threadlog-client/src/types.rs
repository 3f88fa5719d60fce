//! Views returned by [`crate::Threadlog`].

use serde::Serialize;

use threadlog_core::{Address, LikeBitmap, Post, ThreadForest, UserId, UserProfile};

/// A post with its reconstructed comment threads.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadView {
    /// Address of the post.
    pub address: Address,
    /// The post as fetched.
    pub post: Post,
    /// Comment threads.
    pub forest: ThreadForest,
    /// Page indices that could not be fetched. Their comments are absent
    /// from `forest` and their replies appear as orphans.
    pub missing_pages: Vec<u64>,
}

impl ThreadView {
    /// Whether every page was fetched.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_pages.is_empty()
    }
}

/// What a viewer has done on one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionState {
    /// The viewer liked the post.
    pub liked_post: bool,
    /// Comments the viewer liked.
    pub comment_likes: LikeBitmap,
    /// The viewer follows the post's author.
    pub following_author: bool,
}

/// A post and its address, as listed in a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostEntry {
    /// Address of the post.
    pub address: Address,
    /// The post.
    pub post: Post,
}

/// Activity totals for one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSummary {
    /// The author.
    pub user: UserId,
    /// Posts the author created.
    pub posts: u64,
    /// Comments left on the author's posts.
    pub comments_received: u64,
    /// Stored profile counters, if the author created a profile.
    pub profile: Option<UserProfile>,
}
