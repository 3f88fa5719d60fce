//! Per-user comment like bitmap.
//!
//! One bit per global comment index, least significant bit first within
//! each byte. The byte length is part of the wire format.

use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CapacityError;

/// Size of a like bitmap in bytes.
pub const BITMAP_BYTES: usize = 128;

/// Number of comment indices a bitmap can track.
pub const BITMAP_CAPACITY: u64 = BITMAP_BYTES as u64 * 8;

/// Errors from [`LikeBitmap::set`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitmapError {
    /// The bit is already set.
    #[error("comment {index} already liked")]
    AlreadyLiked {
        /// Global comment index.
        index: u64,
    },

    /// The index is beyond [`BITMAP_CAPACITY`].
    #[error(transparent)]
    Capacity(#[from] CapacityError),
}

/// Fixed-size set of liked comment indices.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LikeBitmap([u8; BITMAP_BYTES]);

impl LikeBitmap {
    /// An all-zero bitmap.
    #[must_use]
    pub const fn new() -> Self {
        Self([0; BITMAP_BYTES])
    }

    /// Wrap raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; BITMAP_BYTES]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; BITMAP_BYTES] {
        &self.0
    }

    /// Whether comment `index` is marked liked.
    ///
    /// Indices beyond capacity read as not liked.
    #[must_use]
    pub fn is_set(&self, index: u64) -> bool {
        match Self::position(index) {
            Some((byte, bit)) => self.0[byte] & (1 << bit) != 0,
            None => false,
        }
    }

    /// Mark comment `index` as liked.
    ///
    /// # Errors
    ///
    /// - [`BitmapError::AlreadyLiked`] if the bit is already set.
    /// - [`BitmapError::Capacity`] if `index` is beyond capacity.
    pub fn set(&mut self, index: u64) -> Result<(), BitmapError> {
        let (byte, bit) = Self::position(index).ok_or(CapacityError::BitmapIndexOutOfRange {
            index,
            capacity: BITMAP_CAPACITY,
        })?;

        if self.0[byte] & (1 << bit) != 0 {
            return Err(BitmapError::AlreadyLiked { index });
        }

        self.0[byte] |= 1 << bit;
        Ok(())
    }

    /// Whether `index` can be tracked at all.
    #[must_use]
    pub const fn in_capacity(index: u64) -> bool {
        index < BITMAP_CAPACITY
    }

    /// Iterate over the set indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..BITMAP_CAPACITY).filter(|index| self.is_set(*index))
    }

    /// Number of set bits.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.0.iter().map(|byte| byte.count_ones()).sum()
    }

    // Index arithmetic: byte = index / 8, bit = index % 8.
    #[allow(clippy::cast_possible_truncation)]
    fn position(index: u64) -> Option<(usize, u8)> {
        let byte = index / 8;
        if byte >= BITMAP_BYTES as u64 {
            return None;
        }
        Some((byte as usize, (index % 8) as u8))
    }
}

impl Default for LikeBitmap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LikeBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for LikeBitmap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for LikeBitmap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_bytes(BitmapVisitor)
    }
}

struct BitmapVisitor;

impl<'de> Visitor<'de> for BitmapVisitor {
    type Value = LikeBitmap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{BITMAP_BYTES} bytes")
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        let bytes: [u8; BITMAP_BYTES] = v
            .try_into()
            .map_err(|_| E::invalid_length(v.len(), &self))?;
        Ok(LikeBitmap(bytes))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
        self.visit_bytes(&v)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut bytes = [0u8; BITMAP_BYTES];
        for (i, slot) in bytes.iter_mut().enumerate() {
            *slot = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))?;
        }
        if seq.next_element::<u8>()?.is_some() {
            return Err(de::Error::invalid_length(BITMAP_BYTES + 1, &self));
        }
        Ok(LikeBitmap(bytes))
    }
}
