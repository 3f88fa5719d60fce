//! Deterministic address derivation.
//!
//! Every record other than a post lives at an address computed from its
//! kind and a short list of seeds, so writers and readers can locate a
//! record without any lookup table:
//!
//! ```text
//! sha256("threadlog/address/v1" || len(tag) || tag || (len(seed) || seed)*)
//! ```
//!
//! Lengths are single bytes, which keeps `["ab", "c"]` and `["a", "bc"]`
//! apart.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ids::{Address, UserId};

/// Maximum length of a single seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds per derivation.
pub const MAX_SEEDS: usize = 16;

const DOMAIN: &[u8] = b"threadlog/address/v1";

/// The kinds of records stored on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// A top-level post.
    Post,
    /// A fixed-capacity page of comments belonging to a post.
    CommentPage,
    /// Marker that a user liked a post.
    UserLike,
    /// Per (user, post) bitmap of liked comments.
    UserCommentLikes,
    /// Marker that one user follows another.
    UserFollow,
    /// Aggregated counters for a user.
    UserProfile,
}

impl RecordKind {
    /// All record kinds, in tag order.
    pub const ALL: [Self; 6] = [
        Self::Post,
        Self::CommentPage,
        Self::UserLike,
        Self::UserCommentLikes,
        Self::UserFollow,
        Self::UserProfile,
    ];

    /// The seed tag mixed into derived addresses of this kind.
    #[must_use]
    pub const fn seed_tag(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::CommentPage => "comment_page",
            Self::UserLike => "user_like",
            Self::UserCommentLikes => "user_comment_likes",
            Self::UserFollow => "user_follow",
            Self::UserProfile => "user_profile",
        }
    }

    /// Single-byte tag, used by storage indexes.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Post => 0,
            Self::CommentPage => 1,
            Self::UserLike => 2,
            Self::UserCommentLikes => 3,
            Self::UserFollow => 4,
            Self::UserProfile => 5,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.seed_tag())
    }
}

impl FromStr for RecordKind {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.seed_tag() == s)
            .ok_or_else(|| AddressError::UnknownKind(s.to_string()))
    }
}

/// Errors raised by address derivation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// A seed exceeded [`MAX_SEED_LEN`].
    #[error("seed {index} is {len} bytes, maximum is {MAX_SEED_LEN}")]
    SeedTooLong {
        /// Position of the offending seed.
        index: usize,
        /// Its length in bytes.
        len: usize,
    },

    /// More than [`MAX_SEEDS`] seeds were supplied.
    #[error("{count} seeds supplied, maximum is {MAX_SEEDS}")]
    TooManySeeds {
        /// Number of seeds supplied.
        count: usize,
    },

    /// The record kind name is not recognised.
    #[error("unknown record kind: {0}")]
    UnknownKind(String),
}

/// Derive the address of a record from its kind and seeds.
///
/// # Errors
///
/// Returns an error if a seed is longer than [`MAX_SEED_LEN`] or more than
/// [`MAX_SEEDS`] seeds are given.
pub fn derive_address<S: AsRef<[u8]>>(kind: RecordKind, seeds: &[S]) -> Result<Address, AddressError> {
    if seeds.len() > MAX_SEEDS {
        return Err(AddressError::TooManySeeds { count: seeds.len() });
    }

    for (index, seed) in seeds.iter().enumerate() {
        let len = seed.as_ref().len();
        if len > MAX_SEED_LEN {
            return Err(AddressError::SeedTooLong { index, len });
        }
    }

    let address = hash_seeds(kind, seeds);
    tracing::debug!(kind = %kind, address = %address, seeds = seeds.len(), "Derived address");
    Ok(address)
}

fn hash_seeds<S: AsRef<[u8]>>(kind: RecordKind, seeds: &[S]) -> Address {
    let tag = kind.seed_tag().as_bytes();
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN);
    hasher.update([length_byte(tag.len())]);
    hasher.update(tag);
    for seed in seeds {
        let seed = seed.as_ref();
        hasher.update([length_byte(seed.len())]);
        hasher.update(seed);
    }
    Address::from_bytes(hasher.finalize().into())
}

// Tags and seeds are bounded by MAX_SEED_LEN, well below 256.
#[allow(clippy::cast_possible_truncation)]
const fn length_byte(len: usize) -> u8 {
    len as u8
}

/// Canonical seeds for a comment page: post address and little-endian page index.
#[must_use]
pub fn comment_page_seeds(post: &Address, page_index: u64) -> Vec<Vec<u8>> {
    vec![post.as_bytes().to_vec(), page_index.to_le_bytes().to_vec()]
}

/// Canonical seeds for a (user, post) record.
#[must_use]
pub fn user_post_seeds(user: &UserId, post: &Address) -> Vec<Vec<u8>> {
    vec![user.as_bytes().to_vec(), post.as_bytes().to_vec()]
}

/// Canonical seeds for a follow record.
#[must_use]
pub fn follow_seeds(follower: &UserId, target: &UserId) -> Vec<Vec<u8>> {
    vec![follower.as_bytes().to_vec(), target.as_bytes().to_vec()]
}

/// Canonical seeds for a user profile.
#[must_use]
pub fn profile_seeds(owner: &UserId) -> Vec<Vec<u8>> {
    vec![owner.as_bytes().to_vec()]
}

/// Address of page `page_index` of `post`.
#[must_use]
pub fn comment_page_address(post: &Address, page_index: u64) -> Address {
    derive_canonical(RecordKind::CommentPage, &comment_page_seeds(post, page_index))
}

/// Address of the record marking that `user` liked `post`.
#[must_use]
pub fn user_like_address(user: &UserId, post: &Address) -> Address {
    derive_canonical(RecordKind::UserLike, &user_post_seeds(user, post))
}

/// Address of `user`'s comment-like bitmap for `post`.
#[must_use]
pub fn user_comment_likes_address(user: &UserId, post: &Address) -> Address {
    derive_canonical(RecordKind::UserCommentLikes, &user_post_seeds(user, post))
}

/// Address of the record marking that `follower` follows `target`.
#[must_use]
pub fn user_follow_address(follower: &UserId, target: &UserId) -> Address {
    derive_canonical(RecordKind::UserFollow, &follow_seeds(follower, target))
}

/// Address of `owner`'s profile.
#[must_use]
pub fn user_profile_address(owner: &UserId) -> Address {
    derive_canonical(RecordKind::UserProfile, &profile_seeds(owner))
}

// Canonical seed lists are at most two seeds of at most 32 bytes each.
fn derive_canonical(kind: RecordKind, seeds: &[Vec<u8>]) -> Address {
    debug_assert!(seeds.iter().all(|seed| seed.len() <= MAX_SEED_LEN));
    hash_seeds(kind, seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let post = Address::generate();
        assert_eq!(comment_page_address(&post, 3), comment_page_address(&post, 3));
    }

    #[test]
    fn canonical_helpers_match_checked_derivation() {
        let post = Address::generate();
        let user = UserId::generate();

        assert_eq!(
            comment_page_address(&post, 7),
            derive_address(RecordKind::CommentPage, &comment_page_seeds(&post, 7)).unwrap()
        );
        assert_eq!(
            user_comment_likes_address(&user, &post),
            derive_address(RecordKind::UserCommentLikes, &user_post_seeds(&user, &post)).unwrap()
        );
        assert_eq!(
            user_profile_address(&user),
            derive_address(RecordKind::UserProfile, &profile_seeds(&user)).unwrap()
        );
    }

    #[test]
    fn distinct_pages_get_distinct_addresses() {
        let post = Address::generate();
        let addresses: std::collections::HashSet<_> =
            (0..100).map(|page| comment_page_address(&post, page)).collect();
        assert_eq!(addresses.len(), 100);
    }

    #[test]
    fn kind_separates_identical_seeds() {
        let user = UserId::generate();
        let post = Address::generate();
        assert_ne!(user_like_address(&user, &post), user_comment_likes_address(&user, &post));
    }

    #[test]
    fn seed_boundaries_are_unambiguous() {
        let a = derive_address(RecordKind::Post, &[b"ab".as_slice(), b"c"]).unwrap();
        let b = derive_address(RecordKind::Post, &[b"a".as_slice(), b"bc"]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn follow_direction_matters() {
        let alice = UserId::generate();
        let bob = UserId::generate();
        assert_ne!(user_follow_address(&alice, &bob), user_follow_address(&bob, &alice));
    }

    #[test]
    fn rejects_long_seed() {
        let seed = [0u8; MAX_SEED_LEN + 1];
        assert_eq!(
            derive_address(RecordKind::Post, &[seed.as_slice()]),
            Err(AddressError::SeedTooLong {
                index: 0,
                len: MAX_SEED_LEN + 1
            })
        );
    }

    #[test]
    fn rejects_too_many_seeds() {
        let seeds = vec![[1u8; 4]; MAX_SEEDS + 1];
        assert_eq!(
            derive_address(RecordKind::Post, &seeds),
            Err(AddressError::TooManySeeds {
                count: MAX_SEEDS + 1
            })
        );
    }

    #[test]
    fn record_kind_parses_from_tag() {
        for kind in RecordKind::ALL {
            assert_eq!(kind.seed_tag().parse::<RecordKind>().unwrap(), kind);
        }
        assert!("nope".parse::<RecordKind>().is_err());
    }
}
