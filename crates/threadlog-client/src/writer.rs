//! Post and comment write path.

use threadlog_core::address::{comment_page_address, comment_page_seeds};
use threadlog_core::{
    pager, validate_comment, validate_post, Address, CapacityError, CommentPage, Instruction,
    Ledger, LedgerError, ParentRef, ProgramError, RecordKind, UserId, ValidationError,
};

use crate::client::Threadlog;
use crate::error::ClientError;

impl<L: Ledger> Threadlog<L> {
    /// Create a post, returning its new address.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an oversized topic or empty/oversized
    /// content, or the ledger error if the submission fails.
    pub async fn create_post(
        &self,
        author: &UserId,
        topic: &str,
        content: &str,
    ) -> Result<Address, ClientError> {
        validate_post(topic, content)?;

        let post = Address::generate();
        self.ledger
            .submit_mutation(
                Instruction::CreatePost {
                    post,
                    topic: topic.to_string(),
                    content: content.to_string(),
                },
                author,
            )
            .await?;

        tracing::info!(post = %post, author = %author, "Post created");
        Ok(post)
    }

    /// Append a comment to a post, returning its global index.
    ///
    /// The post is re-read first so page and index come from the current
    /// count. When the count sits on a page boundary the next page is created;
    /// losing that creation race to another writer is not an error.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Validation`] for bad content or a parent that does not exist yet.
    /// - [`ClientError::NotFound`] if the post does not exist.
    /// - [`ClientError::Capacity`] if the page filled up underneath us.
    /// - [`ClientError::Ledger`] for any other ledger failure, including a
    ///   stale page when another comment landed after the post was read.
    pub async fn add_comment(
        &self,
        post_address: &Address,
        author: &UserId,
        content: &str,
        parent: ParentRef,
    ) -> Result<u64, ClientError> {
        validate_comment(content)?;

        let post = self.require_post(post_address).await?;
        let count = post.comment_count;

        if let ParentRef::Parent(index) = parent {
            if index >= count {
                return Err(ValidationError::InvalidParent {
                    parent: index,
                    comment_count: count,
                }
                .into());
            }
        }

        let page_index = pager::target_page(count);
        let global_index = pager::global_index_for_next(count);
        if pager::is_page_boundary(count) {
            self.open_page(post_address, page_index).await?;
        }

        self.ledger
            .submit_mutation(
                Instruction::AddComment {
                    post: *post_address,
                    page_index,
                    global_index,
                    content: content.to_string(),
                    parent_index: parent,
                },
                author,
            )
            .await
            .map_err(|e| match e {
                LedgerError::Rejected(ProgramError::PageFull) => {
                    ClientError::Capacity(CapacityError::PageFull { page_index })
                }
                other => ClientError::Ledger(other),
            })?;

        tracing::info!(
            post = %post_address,
            page_index,
            global_index,
            "Comment added"
        );
        Ok(global_index)
    }

    /// Create the comment page, tolerating a concurrent creator.
    async fn open_page(&self, post_address: &Address, page_index: u64) -> Result<(), ClientError> {
        let address = comment_page_address(post_address, page_index);
        let result = self
            .ledger
            .create_and_append(
                RecordKind::CommentPage,
                &address,
                &comment_page_seeds(post_address, page_index),
                CommentPage::new(*post_address, page_index).into(),
            )
            .await;

        match result {
            Ok(()) => {
                tracing::debug!(post = %post_address, page_index, "Comment page created");
                Ok(())
            }
            Err(LedgerError::AlreadyExists { .. }) => {
                tracing::warn!(post = %post_address, page_index, "Comment page already created");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
