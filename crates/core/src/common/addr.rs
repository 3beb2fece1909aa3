//! Cache-line address type.
//!
//! The prefetcher never reasons about byte offsets inside a line, so every address that
//! enters the engine is converted to a line address once at intake.

use serde::{Deserialize, Serialize};

/// A cache-line address (byte address shifted right by the block offset).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineAddr(pub u64);

impl LineAddr {
    /// Converts a byte address into a line address.
    ///
    /// # Arguments
    ///
    /// * `addr` - Raw byte address.
    /// * `block_offset_bits` - log2 of the cache line size.
    #[inline(always)]
    pub const fn from_byte(addr: u64, block_offset_bits: u32) -> Self {
        Self(addr >> block_offset_bits)
    }

    /// Returns the raw line address value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }

    /// Returns the first byte address of this line.
    #[inline(always)]
    pub const fn to_byte(self, block_offset_bits: u32) -> u64 {
        self.0 << block_offset_bits
    }

    /// Returns the bits of this address above bit `width`.
    #[inline(always)]
    pub const fn high_bits(self, width: u32) -> u64 {
        if width >= 64 { 0 } else { self.0 >> width }
    }

    /// Returns the low `width` bits of this address.
    #[inline(always)]
    pub const fn low_bits(self, width: u32) -> u64 {
        if width >= 64 {
            self.0
        } else {
            self.0 & ((1u64 << width) - 1)
        }
    }

    /// Rebuilds a full line address from this address's high bits and the given low bits.
    #[inline(always)]
    pub const fn splice_low(self, width: u32, low: u64) -> Self {
        if width >= 64 {
            Self(low)
        } else {
            let mask = (1u64 << width) - 1;
            Self((self.0 & !mask) | (low & mask))
        }
    }

    /// Returns true when `other` shares every bit above `width` with `self`.
    #[inline(always)]
    pub const fn shares_prefix(self, other: Self, width: u32) -> bool {
        self.high_bits(width) == other.high_bits(width)
    }
}

impl std::fmt::Display for LineAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
