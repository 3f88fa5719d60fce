//! Post listings and profiles.

use std::cmp::Reverse;

use threadlog_core::address::user_profile_address;
use threadlog_core::{
    DuplicateInteraction, Instruction, Ledger, LedgerError, ProgramError, Record, RecordKind,
    UserId, UserProfile,
};

use crate::client::Threadlog;
use crate::error::ClientError;
use crate::types::{AuthorSummary, PostEntry};

impl<L: Ledger> Threadlog<L> {
    /// All posts, newest first. Posts from the same second are ordered by address.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be scanned.
    pub async fn list_posts(&self) -> Result<Vec<PostEntry>, ClientError> {
        let records = self.ledger.fetch_all(RecordKind::Post).await?;

        let mut posts: Vec<PostEntry> = records
            .into_iter()
            .filter_map(|(address, record)| {
                record.into_post().map(|post| PostEntry { address, post })
            })
            .collect();
        posts.sort_by_key(|entry| (Reverse(entry.post.timestamp), entry.address));

        tracing::debug!(count = posts.len(), "Listed posts");
        Ok(posts)
    }

    /// Posts by one author, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be scanned.
    pub async fn posts_by_author(&self, author: &UserId) -> Result<Vec<PostEntry>, ClientError> {
        let mut posts = self.list_posts().await?;
        posts.retain(|entry| entry.post.author == *author);
        Ok(posts)
    }

    /// Posts with exactly this topic, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be scanned.
    pub async fn posts_by_topic(&self, topic: &str) -> Result<Vec<PostEntry>, ClientError> {
        let mut posts = self.list_posts().await?;
        posts.retain(|entry| entry.post.topic == topic);
        Ok(posts)
    }

    /// A user's profile; `None` if they have not created one.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger fails or the address holds another kind.
    pub async fn profile(&self, owner: &UserId) -> Result<Option<UserProfile>, ClientError> {
        self.fetch_as(
            &user_profile_address(owner),
            RecordKind::UserProfile,
            Record::into_user_profile,
        )
        .await
    }

    /// Create the caller's profile. Counters start at zero.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Duplicate`] if the profile exists, or the ledger error.
    pub async fn create_profile(&self, owner: &UserId) -> Result<(), ClientError> {
        if self.profile(owner).await?.is_some() {
            return Err(DuplicateInteraction::ProfileExists { owner: *owner }.into());
        }

        self.ledger
            .submit_mutation(Instruction::CreateProfile, owner)
            .await
            .map_err(|e| match e {
                LedgerError::Rejected(ProgramError::AccountInUse) => {
                    ClientError::Duplicate(DuplicateInteraction::ProfileExists { owner: *owner })
                }
                other => ClientError::Ledger(other),
            })?;

        tracing::info!(owner = %owner, "Profile created");
        Ok(())
    }

    /// Post and comment totals for an author, plus stored profile counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger fails.
    pub async fn author_summary(&self, user: &UserId) -> Result<AuthorSummary, ClientError> {
        let (posts, profile) = tokio::join!(self.posts_by_author(user), self.profile(user));
        let posts = posts?;

        Ok(AuthorSummary {
            user: *user,
            posts: posts.len() as u64,
            comments_received: posts.iter().map(|entry| entry.post.comment_count).sum(),
            profile: profile?,
        })
    }
}
