//! Length limits, checked before anything is sent to the ledger.
//!
//! Limits count UTF-8 bytes, matching what the ledger enforces.

use crate::error::ValidationError;

/// Maximum post topic length in bytes.
pub const MAX_TOPIC_LEN: usize = 50;

/// Maximum post content length in bytes.
pub const MAX_POST_CONTENT_LEN: usize = 280;

/// Maximum comment content length in bytes.
pub const MAX_COMMENT_LEN: usize = 100;

/// Validate a new post's topic and content.
///
/// # Errors
///
/// Returns the first limit violated.
pub fn validate_post(topic: &str, content: &str) -> Result<(), ValidationError> {
    if topic.len() > MAX_TOPIC_LEN {
        return Err(ValidationError::TopicTooLong {
            len: topic.len(),
            max: MAX_TOPIC_LEN,
        });
    }
    if content.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    if content.len() > MAX_POST_CONTENT_LEN {
        return Err(ValidationError::ContentTooLong {
            len: content.len(),
            max: MAX_POST_CONTENT_LEN,
        });
    }
    Ok(())
}

/// Validate a comment's content.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyContent`] or [`ValidationError::ContentTooLong`].
pub fn validate_comment(content: &str) -> Result<(), ValidationError> {
    if content.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    if content.len() > MAX_COMMENT_LEN {
        return Err(ValidationError::ContentTooLong {
            len: content.len(),
            max: MAX_COMMENT_LEN,
        });
    }
    Ok(())
}
