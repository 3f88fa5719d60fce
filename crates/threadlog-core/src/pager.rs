//! Comment page arithmetic.
//!
//! Comments are stored in fixed-capacity pages. A comment's global index is
//! never stored; it is computed from the page it lives in and its offset
//! within that page. Because of that, [`PAGE_SIZE`] is a protocol constant:
//! writers and readers must agree on it.

/// Number of comments a page holds.
pub const PAGE_SIZE: u64 = 10;

/// Page that the comment with sequence number `comment_count` lands in.
#[must_use]
pub const fn target_page(comment_count: u64) -> u64 {
    comment_count / PAGE_SIZE
}

/// True when the next append is the first slot of a new page, i.e. the page
/// must be created before appending.
#[must_use]
pub const fn is_page_boundary(comment_count: u64) -> bool {
    comment_count % PAGE_SIZE == 0
}

/// Global index the next append receives.
#[must_use]
pub const fn global_index_for_next(comment_count: u64) -> u64 {
    comment_count
}

/// Number of pages holding `comment_count` comments.
#[must_use]
pub const fn total_pages(comment_count: u64) -> u64 {
    comment_count.div_ceil(PAGE_SIZE)
}

/// Global index of the comment at `offset` within page `page_index`.
#[must_use]
pub const fn global_index(page_index: u64, offset: u64) -> u64 {
    page_index * PAGE_SIZE + offset
}

/// Split a global index into `(page_index, offset)`.
#[must_use]
pub const fn locate(global_index: u64) -> (u64, u64) {
    (global_index / PAGE_SIZE, global_index % PAGE_SIZE)
}
