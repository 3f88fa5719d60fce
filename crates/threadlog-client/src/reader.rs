//! Thread aggregation: fetch every page of a post and rebuild its threads.

use futures::future::join_all;

use threadlog_core::address::comment_page_address;
use threadlog_core::{
    build_forest, pager, Address, CommentPage, Ledger, Record, RecordKind, ThreadForest, PAGE_SIZE,
};

use crate::client::Threadlog;
use crate::error::ClientError;
use crate::types::ThreadView;

impl<L: Ledger> Threadlog<L> {
    /// Read a post and all of its comments as reply threads.
    ///
    /// Pages are fetched concurrently. A page that is missing or fails to
    /// load is logged and listed in [`ThreadView::missing_pages`]; replies to
    /// comments on it are kept as orphans.
    ///
    /// # Errors
    ///
    /// Returns an error only if the post itself cannot be read.
    pub async fn read_thread(&self, post_address: &Address) -> Result<ThreadView, ClientError> {
        let post = self.require_post(post_address).await?;
        let total_pages = pager::total_pages(post.comment_count);

        if total_pages == 0 {
            return Ok(ThreadView {
                address: *post_address,
                post,
                forest: ThreadForest::default(),
                missing_pages: Vec::new(),
            });
        }

        tracing::debug!(post = %post_address, total_pages, "Fetching comment pages");
        let fetches = (0..total_pages).map(|page_index| async move {
            let result = self.comment_page(post_address, page_index).await;
            (page_index, result)
        });
        let results = join_all(fetches).await;

        let mut comments = Vec::new();
        let mut missing_pages = Vec::new();
        for (page_index, result) in results {
            match result {
                Ok(Some(page)) => {
                    if page.comments.len() as u64 > PAGE_SIZE {
                        tracing::warn!(
                            post = %post_address,
                            page_index,
                            comments = page.comments.len(),
                            "Comment page over capacity, truncating"
                        );
                    }
                    if page.page_index != page_index {
                        tracing::warn!(
                            post = %post_address,
                            page_index,
                            stored_page_index = page.page_index,
                            "Comment page mislabeled, using fetched index"
                        );
                    }
                    comments.extend(page.indexed_as(page_index));
                }
                Ok(None) => {
                    tracing::warn!(post = %post_address, page_index, "Comment page missing");
                    missing_pages.push(page_index);
                }
                Err(e) => {
                    tracing::warn!(post = %post_address, page_index, error = %e, "Comment page fetch failed");
                    missing_pages.push(page_index);
                }
            }
        }

        Ok(ThreadView {
            address: *post_address,
            post,
            forest: build_forest(comments),
            missing_pages,
        })
    }

    /// Fetch one comment page; `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger fails or the address holds another kind.
    pub async fn comment_page(
        &self,
        post_address: &Address,
        page_index: u64,
    ) -> Result<Option<CommentPage>, ClientError> {
        let address = comment_page_address(post_address, page_index);
        self.fetch_as(&address, RecordKind::CommentPage, Record::into_comment_page)
            .await
    }
}
