//! Likes, tips and follows.

use threadlog_core::address::{user_comment_likes_address, user_follow_address, user_like_address};
use threadlog_core::{
    Address, BitmapError, CapacityError, CommentLikeTracker, DuplicateInteraction, Instruction,
    Ledger, LedgerError, LikeBitmap, ProgramError, Record, RecordKind, UserId, ValidationError,
    BITMAP_CAPACITY,
};

use crate::client::Threadlog;
use crate::error::ClientError;
use crate::types::InteractionState;

impl<L: Ledger> Threadlog<L> {
    // =========================================================================
    // Reads
    // =========================================================================

    /// Everything `viewer` has done on a post, fetched concurrently.
    ///
    /// Absent records read as "not liked" and "not following".
    ///
    /// # Errors
    ///
    /// Returns an error if the post is missing or a fetch fails.
    pub async fn interaction_state(
        &self,
        viewer: &UserId,
        post_address: &Address,
    ) -> Result<InteractionState, ClientError> {
        let post = self.require_post(post_address).await?;

        let (liked_post, comment_likes, following_author) = tokio::join!(
            self.has_liked_post(viewer, post_address),
            self.comment_likes(viewer, post_address),
            self.is_following(viewer, &post.author),
        );

        Ok(InteractionState {
            liked_post: liked_post?,
            comment_likes: comment_likes?,
            following_author: following_author?,
        })
    }

    /// Whether `user` liked the post.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger fails.
    pub async fn has_liked_post(&self, user: &UserId, post: &Address) -> Result<bool, ClientError> {
        self.exists(&user_like_address(user, post)).await
    }

    /// The comments on a post that `user` liked. All clear if none.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger fails or the address holds another kind.
    pub async fn comment_likes(
        &self,
        user: &UserId,
        post: &Address,
    ) -> Result<LikeBitmap, ClientError> {
        let address = user_comment_likes_address(user, post);
        Ok(self
            .fetch_as(&address, RecordKind::UserCommentLikes, Record::into_user_comment_likes)
            .await?
            .map(|likes| likes.likes_bitmap)
            .unwrap_or_default())
    }

    /// A like tracker seeded with `user`'s current comment likes on a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the bitmap cannot be read.
    pub async fn comment_like_tracker(
        &self,
        user: &UserId,
        post: &Address,
    ) -> Result<CommentLikeTracker, ClientError> {
        Ok(CommentLikeTracker::new(self.comment_likes(user, post).await?))
    }

    /// Whether `follower` follows `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger fails.
    pub async fn is_following(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<bool, ClientError> {
        self.exists(&user_follow_address(follower, target)).await
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Like a post once.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Duplicate`] if already liked, or the ledger error.
    pub async fn like_post(&self, user: &UserId, post: &Address) -> Result<(), ClientError> {
        if self.has_liked_post(user, post).await? {
            return Err(DuplicateInteraction::PostLiked { post: *post }.into());
        }

        self.ledger
            .submit_mutation(Instruction::LikePost { post: *post }, user)
            .await
            .map_err(|e| match e {
                LedgerError::Rejected(ProgramError::AlreadyLiked) => {
                    ClientError::Duplicate(DuplicateInteraction::PostLiked { post: *post })
                }
                other => ClientError::Ledger(other),
            })?;

        tracing::info!(post = %post, user = %user, "Post liked");
        Ok(())
    }

    /// Like a comment once.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Capacity`] if `global_index` is beyond the bitmap.
    /// - [`ClientError::Duplicate`] if already liked.
    /// - [`ClientError::Ledger`] for any other ledger failure.
    pub async fn like_comment(
        &self,
        user: &UserId,
        post: &Address,
        global_index: u64,
    ) -> Result<(), ClientError> {
        if !LikeBitmap::in_capacity(global_index) {
            return Err(out_of_range(global_index).into());
        }
        if self.comment_likes(user, post).await?.is_set(global_index) {
            return Err(DuplicateInteraction::CommentLiked {
                post: *post,
                global_index,
            }
            .into());
        }

        self.submit_comment_like(user, post, global_index).await?;
        tracing::info!(post = %post, user = %user, global_index, "Comment liked");
        Ok(())
    }

    /// Like a comment through a tracker.
    ///
    /// The index is pending while the mutation is in flight and confirmed
    /// once it lands. On failure the pending entry is dropped and the
    /// tracker is reconciled with a fresh bitmap when one can be read.
    ///
    /// # Errors
    ///
    /// Same as [`Threadlog::like_comment`].
    pub async fn like_comment_tracked(
        &self,
        tracker: &mut CommentLikeTracker,
        user: &UserId,
        post: &Address,
        global_index: u64,
    ) -> Result<(), ClientError> {
        tracker.begin(global_index).map_err(|e| match e {
            BitmapError::AlreadyLiked { .. } => ClientError::Duplicate(
                DuplicateInteraction::CommentLiked {
                    post: *post,
                    global_index,
                },
            ),
            BitmapError::Capacity(capacity) => ClientError::Capacity(capacity),
        })?;

        match self.submit_comment_like(user, post, global_index).await {
            Ok(()) => {
                tracker.confirm(global_index);
                tracing::info!(post = %post, user = %user, global_index, "Comment liked");
                Ok(())
            }
            Err(e) => {
                tracker.abandon(global_index);
                match self.comment_likes(user, post).await {
                    Ok(fresh) => tracker.reconcile(fresh),
                    Err(refresh) => {
                        tracing::warn!(post = %post, error = %refresh, "Could not refresh comment likes");
                    }
                }
                Err(e)
            }
        }
    }

    async fn submit_comment_like(
        &self,
        user: &UserId,
        post: &Address,
        global_index: u64,
    ) -> Result<(), ClientError> {
        self.ledger
            .submit_mutation(
                Instruction::LikeComment {
                    post: *post,
                    global_index,
                },
                user,
            )
            .await
            .map_err(|e| match e {
                LedgerError::Rejected(ProgramError::AlreadyLiked) => {
                    ClientError::Duplicate(DuplicateInteraction::CommentLiked {
                        post: *post,
                        global_index,
                    })
                }
                LedgerError::Rejected(ProgramError::CommentIndexOutOfBounds) => {
                    ClientError::Capacity(out_of_range(global_index))
                }
                other => ClientError::Ledger(other),
            })
    }

    /// Tip a post's author.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a zero amount, or the ledger error.
    pub async fn tip_post(
        &self,
        tipper: &UserId,
        post: &Address,
        amount: u64,
    ) -> Result<(), ClientError> {
        if amount == 0 {
            return Err(ValidationError::ZeroTip.into());
        }

        self.ledger
            .submit_mutation(
                Instruction::TipPost {
                    post: *post,
                    amount,
                },
                tipper,
            )
            .await?;

        tracing::info!(post = %post, tipper = %tipper, amount, "Post tipped");
        Ok(())
    }

    /// Follow another user.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Validation`] when following oneself.
    /// - [`ClientError::Duplicate`] if already following.
    /// - [`ClientError::Ledger`] for any other ledger failure.
    pub async fn follow(&self, follower: &UserId, target: &UserId) -> Result<(), ClientError> {
        if follower == target {
            return Err(ValidationError::SelfFollow.into());
        }
        if self.is_following(follower, target).await? {
            return Err(DuplicateInteraction::AlreadyFollowing { target: *target }.into());
        }

        self.ledger
            .submit_mutation(Instruction::FollowUser { target: *target }, follower)
            .await
            .map_err(|e| match e {
                LedgerError::Rejected(ProgramError::AlreadyFollowing) => {
                    ClientError::Duplicate(DuplicateInteraction::AlreadyFollowing {
                        target: *target,
                    })
                }
                other => ClientError::Ledger(other),
            })?;

        tracing::info!(follower = %follower, target = %target, "User followed");
        Ok(())
    }
}

fn out_of_range(index: u64) -> CapacityError {
    CapacityError::BitmapIndexOutOfRange {
        index,
        capacity: BITMAP_CAPACITY,
    }
}
