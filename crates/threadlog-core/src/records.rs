//! Ledger record types.
//!
//! Field names and types here are the persisted layout. Comments have no
//! address of their own: they live inline in a [`CommentPage`] and their
//! identity is the global index computed from page and offset.

use serde::{Deserialize, Serialize};

use crate::address::RecordKind;
use crate::bitmap::LikeBitmap;
use crate::error::CapacityError;
use crate::ids::{Address, UserId};
use crate::pager::{self, PAGE_SIZE};

/// Raw parent value meaning "no parent".
pub const ROOT_SENTINEL: u64 = u64::MAX;

/// A top-level post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Author of the post.
    pub author: UserId,
    /// Creation time, unix seconds (assigned by the ledger).
    pub timestamp: i64,
    /// Topic, at most 50 bytes, may be empty.
    pub topic: String,
    /// Body, at most 280 bytes.
    pub content: String,
    /// Total comments appended so far.
    pub comment_count: u64,
    /// Most recently created comment page.
    pub last_comment_page: Option<Address>,
}

impl Post {
    /// Number of comment pages the post currently spans.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        pager::total_pages(self.comment_count)
    }
}

/// What a comment replies to.
///
/// On the wire this is the parent's global index, or [`ROOT_SENTINEL`] for
/// a top-level comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub enum ParentRef {
    /// A top-level comment.
    Root,
    /// A reply to the comment with this global index.
    Parent(u64),
}

impl ParentRef {
    /// The parent index, if any.
    #[must_use]
    pub const fn index(self) -> Option<u64> {
        match self {
            Self::Root => None,
            Self::Parent(index) => Some(index),
        }
    }

    /// Whether this is a top-level comment.
    #[must_use]
    pub const fn is_root(self) -> bool {
        matches!(self, Self::Root)
    }
}

impl From<u64> for ParentRef {
    fn from(raw: u64) -> Self {
        if raw == ROOT_SENTINEL {
            Self::Root
        } else {
            Self::Parent(raw)
        }
    }
}

impl From<ParentRef> for u64 {
    fn from(parent: ParentRef) -> Self {
        match parent {
            ParentRef::Root => ROOT_SENTINEL,
            ParentRef::Parent(index) => index,
        }
    }
}

impl From<Option<u64>> for ParentRef {
    fn from(parent: Option<u64>) -> Self {
        parent.map_or(Self::Root, Self::from)
    }
}

/// A comment as stored inside a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Author of the comment.
    pub author: UserId,
    /// Creation time, unix seconds (assigned by the ledger).
    pub timestamp: i64,
    /// What this comment replies to.
    #[serde(rename = "parent_index")]
    pub parent: ParentRef,
    /// Body, at most 100 bytes.
    pub content: String,
    /// Number of users who liked it.
    pub like_count: u32,
}

/// A fixed-capacity page of comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPage {
    /// Owning post.
    pub post: Address,
    /// Position of this page in the post's page sequence.
    pub page_index: u64,
    /// Comments in arrival order.
    pub comments: Vec<Comment>,
}

impl CommentPage {
    /// Create an empty page.
    #[must_use]
    pub const fn new(post: Address, page_index: u64) -> Self {
        Self {
            post,
            page_index,
            comments: Vec::new(),
        }
    }

    /// Whether the page holds [`PAGE_SIZE`] comments.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.comments.len() as u64 >= PAGE_SIZE
    }

    /// Append a comment, returning its global index.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::PageFull`] if the page is full.
    pub fn push(&mut self, comment: Comment) -> Result<u64, CapacityError> {
        if self.is_full() {
            return Err(CapacityError::PageFull {
                page_index: self.page_index,
            });
        }
        let offset = self.comments.len() as u64;
        self.comments.push(comment);
        Ok(pager::global_index(self.page_index, offset))
    }

    /// Comment with the given global index, if it lives on this page.
    #[must_use]
    pub fn get(&self, global_index: u64) -> Option<&Comment> {
        self.offset_of(global_index)
            .and_then(|offset| self.comments.get(offset))
    }

    /// Mutable access to the comment with the given global index.
    pub fn get_mut(&mut self, global_index: u64) -> Option<&mut Comment> {
        self.offset_of(global_index)
            .and_then(|offset| self.comments.get_mut(offset))
    }

    /// Comments paired with their global indices, in offset order.
    ///
    /// At most [`PAGE_SIZE`] comments are yielded; anything beyond would
    /// collide with the next page's indices.
    pub fn indexed(&self) -> impl Iterator<Item = IndexedComment> + '_ {
        self.indexed_as(self.page_index)
    }

    /// Like [`CommentPage::indexed`], but numbering from `page_index` instead
    /// of the stored field. Readers pass the index they fetched.
    pub fn indexed_as(&self, page_index: u64) -> impl Iterator<Item = IndexedComment> + '_ {
        (0..PAGE_SIZE)
            .zip(self.comments.iter())
            .map(move |(offset, comment)| IndexedComment {
                global_index: pager::global_index(page_index, offset),
                comment: comment.clone(),
            })
    }

    #[allow(clippy::cast_possible_truncation)]
    fn offset_of(&self, global_index: u64) -> Option<usize> {
        let (page_index, offset) = pager::locate(global_index);
        (page_index == self.page_index).then_some(offset as usize)
    }
}

/// A comment together with its computed global index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedComment {
    /// Position in the post's append order.
    pub global_index: u64,
    /// The comment.
    #[serde(flatten)]
    pub comment: Comment,
}

/// Marker that `user` liked `post`. Existence is the signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLike {
    /// The user who liked.
    pub user: UserId,
    /// The liked post.
    pub post: Address,
}

/// Which comments of `post` the `user` liked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCommentLikes {
    /// The user.
    pub user: UserId,
    /// The post whose comments are tracked.
    pub post: Address,
    /// One bit per global comment index.
    pub likes_bitmap: LikeBitmap,
}

/// Marker that `follower` follows `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFollow {
    /// The following user.
    pub follower: UserId,
    /// The followed user.
    pub target: UserId,
    /// When the follow was recorded, unix seconds.
    pub timestamp: i64,
}

/// Aggregated counters for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Profile owner.
    pub owner: UserId,
    /// Posts created since the profile was created.
    pub post_count: u64,
    /// Likes received on posts and comments.
    pub like_count: u64,
    /// Tips received, in the smallest currency unit.
    pub tip_count: u64,
}

impl UserProfile {
    /// A fresh profile with zeroed counters.
    #[must_use]
    pub const fn new(owner: UserId) -> Self {
        Self {
            owner,
            post_count: 0,
            like_count: 0,
            tip_count: 0,
        }
    }
}

/// Any record the ledger stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Record {
    /// A post.
    Post(Post),
    /// A comment page.
    CommentPage(CommentPage),
    /// A post like marker.
    UserLike(UserLike),
    /// A comment like bitmap.
    UserCommentLikes(UserCommentLikes),
    /// A follow marker.
    UserFollow(UserFollow),
    /// A user profile.
    UserProfile(UserProfile),
}

impl Record {
    /// The kind of this record.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Post(_) => RecordKind::Post,
            Self::CommentPage(_) => RecordKind::CommentPage,
            Self::UserLike(_) => RecordKind::UserLike,
            Self::UserCommentLikes(_) => RecordKind::UserCommentLikes,
            Self::UserFollow(_) => RecordKind::UserFollow,
            Self::UserProfile(_) => RecordKind::UserProfile,
        }
    }
}

macro_rules! record_accessors {
    ($($variant:ident => $into:ident, $as_ref:ident;)*) => {
        impl Record {
            $(
                #[doc = concat!("Unwrap a [`", stringify!($variant), "`] record.")]
                #[must_use]
                pub fn $into(self) -> Option<$variant> {
                    match self {
                        Self::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }

                #[doc = concat!("Borrow a [`", stringify!($variant), "`] record.")]
                #[must_use]
                pub const fn $as_ref(&self) -> Option<&$variant> {
                    match self {
                        Self::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            )*
        }

        $(
            impl From<$variant> for Record {
                fn from(inner: $variant) -> Self {
                    Self::$variant(inner)
                }
            }
        )*
    };
}

record_accessors! {
    Post => into_post, as_post;
    CommentPage => into_comment_page, as_comment_page;
    UserLike => into_user_like, as_user_like;
    UserCommentLikes => into_user_comment_likes, as_user_comment_likes;
    UserFollow => into_user_follow, as_user_follow;
    UserProfile => into_user_profile, as_user_profile;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(parent: ParentRef) -> Comment {
        Comment {
            author: UserId::generate(),
            timestamp: 1_700_000_000,
            parent,
            content: "hi".into(),
            like_count: 0,
        }
    }

    #[test]
    fn parent_ref_uses_max_as_root() {
        assert_eq!(u64::from(ParentRef::Root), u64::MAX);
        assert_eq!(ParentRef::from(u64::MAX), ParentRef::Root);
        assert_eq!(ParentRef::from(5), ParentRef::Parent(5));
        assert_eq!(ParentRef::from(None), ParentRef::Root);
        assert_eq!(ParentRef::from(Some(3)), ParentRef::Parent(3));
    }

    #[test]
    fn comment_serializes_parent_as_raw_index() {
        let json = serde_json::to_value(comment(ParentRef::Root)).unwrap();
        assert_eq!(json["parent_index"], serde_json::json!(u64::MAX));

        let json = serde_json::to_value(comment(ParentRef::Parent(12))).unwrap();
        assert_eq!(json["parent_index"], 12);
    }

    #[test]
    fn push_assigns_global_indices() {
        let mut page = CommentPage::new(Address::generate(), 2);
        assert_eq!(page.push(comment(ParentRef::Root)).unwrap(), 20);
        assert_eq!(page.push(comment(ParentRef::Parent(20))).unwrap(), 21);
        assert!(page.get(21).is_some());
        assert!(page.get(22).is_none());
        assert!(page.get(1).is_none());
    }

    #[test]
    fn full_page_rejects_push() {
        let mut page = CommentPage::new(Address::generate(), 0);
        for _ in 0..PAGE_SIZE {
            page.push(comment(ParentRef::Root)).unwrap();
        }
        assert!(page.is_full());
        assert_eq!(
            page.push(comment(ParentRef::Root)),
            Err(CapacityError::PageFull { page_index: 0 })
        );
    }

    #[test]
    fn indexed_caps_at_page_size() {
        let mut page = CommentPage::new(Address::generate(), 1);
        page.comments = (0..PAGE_SIZE + 2).map(|_| comment(ParentRef::Root)).collect();
        let indices: Vec<_> = page.indexed().map(|c| c.global_index).collect();
        assert_eq!(indices, (10..20).collect::<Vec<_>>());
    }

    #[test]
    fn indexed_as_ignores_stored_page_index() {
        let mut page = CommentPage::new(Address::generate(), 0);
        page.comments = (0..3).map(|_| comment(ParentRef::Root)).collect();
        let indices: Vec<_> = page.indexed_as(4).map(|c| c.global_index).collect();
        assert_eq!(indices, vec![40, 41, 42]);
    }

    #[test]
    fn record_json_is_tagged() {
        let record = Record::UserLike(UserLike {
            user: UserId::generate(),
            post: Address::generate(),
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "user_like");
        let parsed: Record = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(parsed.kind(), RecordKind::UserLike);
    }

    #[test]
    fn accessors_match_variant() {
        let record: Record = CommentPage::new(Address::generate(), 0).into();
        assert!(record.as_comment_page().is_some());
        assert!(record.as_post().is_none());
        assert!(record.into_comment_page().is_some());
    }
}
