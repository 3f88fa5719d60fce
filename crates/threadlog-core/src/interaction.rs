//! Comment like state for one viewer on one post.
//!
//! A like moves `Unliked -> Pending` when submitted and `Pending -> Confirmed`
//! once the ledger accepts it. A failed submission is abandoned, and a fresh
//! bitmap from the ledger can always be reconciled in.

use std::collections::BTreeSet;

use crate::bitmap::{BitmapError, LikeBitmap, BITMAP_CAPACITY};
use crate::error::CapacityError;

/// Like state of a single comment index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    /// Not liked.
    Unliked,
    /// Submitted, awaiting the ledger.
    Pending,
    /// Recorded on the ledger.
    Confirmed,
}

/// Pending and confirmed comment likes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentLikeTracker {
    confirmed: LikeBitmap,
    pending: BTreeSet<u64>,
}

impl CommentLikeTracker {
    /// Start from the bitmap last read from the ledger.
    #[must_use]
    pub fn new(confirmed: LikeBitmap) -> Self {
        Self {
            confirmed,
            pending: BTreeSet::new(),
        }
    }

    /// State of comment `index`.
    #[must_use]
    pub fn state(&self, index: u64) -> LikeState {
        if self.confirmed.is_set(index) {
            LikeState::Confirmed
        } else if self.pending.contains(&index) {
            LikeState::Pending
        } else {
            LikeState::Unliked
        }
    }

    /// Whether comment `index` should be shown as liked.
    #[must_use]
    pub fn is_liked(&self, index: u64) -> bool {
        self.state(index) != LikeState::Unliked
    }

    /// Mark `index` pending.
    ///
    /// # Errors
    ///
    /// - [`BitmapError::AlreadyLiked`] if `index` is pending or confirmed.
    /// - [`BitmapError::Capacity`] if `index` is beyond the bitmap.
    pub fn begin(&mut self, index: u64) -> Result<(), BitmapError> {
        if !LikeBitmap::in_capacity(index) {
            return Err(CapacityError::BitmapIndexOutOfRange {
                index,
                capacity: BITMAP_CAPACITY,
            }
            .into());
        }
        if self.is_liked(index) {
            return Err(BitmapError::AlreadyLiked { index });
        }
        self.pending.insert(index);
        Ok(())
    }

    /// Move `index` from pending to confirmed. Returns false if it was not pending.
    pub fn confirm(&mut self, index: u64) -> bool {
        if !self.pending.remove(&index) {
            return false;
        }
        // In capacity: begin() checked it.
        let _ = self.confirmed.set(index);
        true
    }

    /// Drop a pending like after a failed submission.
    pub fn abandon(&mut self, index: u64) -> bool {
        self.pending.remove(&index)
    }

    /// Replace confirmed state with a fresh bitmap from the ledger.
    ///
    /// Pending likes already visible in `fresh` are dropped.
    pub fn reconcile(&mut self, fresh: LikeBitmap) {
        self.pending.retain(|index| !fresh.is_set(*index));
        self.confirmed = fresh;
    }

    /// Like count to show for comment `index`, given the count last read
    /// from the ledger. A pending like adds one until it is confirmed.
    #[must_use]
    pub fn displayed_like_count(&self, index: u64, stored: u32) -> u32 {
        if self.pending.contains(&index) {
            stored.saturating_add(1)
        } else {
            stored
        }
    }

    /// Confirmed likes.
    #[must_use]
    pub fn confirmed(&self) -> &LikeBitmap {
        &self.confirmed
    }

    /// Pending indices in ascending order.
    pub fn pending(&self) -> impl Iterator<Item = u64> + '_ {
        self.pending.iter().copied()
    }
}
