//! Record compression.
//!
//! A recorded address sequence is stored as a 512-bit payload of fixed-width slots. Each
//! slot keeps only the low bits of a line address; the high bits are shared with the
//! trigger (slot 0) and restored on replay. Four modes trade slot width for capacity:
//!
//! | Mode     | Slot width (line bits) | Capacity |
//! |----------|------------------------|----------|
//! | `Wide`   | 39                     | 13       |
//! | `Medium` | 30                     | 17       |
//! | `Narrow` | 23                     | 22       |
//! | `Tiny`   | 20                     | 25       |
//!
//! The best mode for a history is the narrowest one in which every address shares the
//! trigger's high bits. It is recomputed over the whole history after every append, so a
//! late far address widens the mode and the earlier entries are re-sliced at the new width.

use serde::{Deserialize, Serialize};

use crate::common::addr::LineAddr;
use crate::common::constants::{PAYLOAD_BITS, PAYLOAD_WORDS};
use crate::prefetch::types::Trigger;

/// Slot width and capacity of one mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeGeometry {
    /// Low line-address bits stored per slot.
    pub width: u32,
    /// Slots that fit in the payload, trigger included.
    pub capacity: usize,
}

const GEOMETRY: [ModeGeometry; 4] = [
    ModeGeometry {
        width: 39,
        capacity: 13,
    },
    ModeGeometry {
        width: 30,
        capacity: 17,
    },
    ModeGeometry {
        width: 23,
        capacity: 22,
    },
    ModeGeometry {
        width: 20,
        capacity: 25,
    },
];

/// Payload encoding mode, widest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CompressionMode {
    /// 39-bit slots.
    #[default]
    Wide = 0,
    /// 30-bit slots.
    Medium = 1,
    /// 23-bit slots.
    Narrow = 2,
    /// 20-bit slots.
    Tiny = 3,
}

impl CompressionMode {
    /// Every mode, widest first.
    pub const ALL: [Self; 4] = [Self::Wide, Self::Medium, Self::Narrow, Self::Tiny];

    /// Returns the mode's position in [`ALL`](Self::ALL).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the mode's slot width and capacity.
    #[inline]
    pub const fn geometry(self) -> ModeGeometry {
        GEOMETRY[self.index()]
    }

    /// Low line-address bits stored per slot.
    #[inline]
    pub const fn width(self) -> u32 {
        self.geometry().width
    }

    /// Addresses a record in this mode can hold, trigger included.
    #[inline]
    pub const fn capacity(self) -> usize {
        self.geometry().capacity
    }

    /// Returns true if `addr` can be restored from its low bits and the trigger's high bits.
    #[inline]
    pub const fn fits(self, trigger: LineAddr, addr: LineAddr) -> bool {
        trigger.shares_prefix(addr, self.width())
    }

    /// Returns the narrowest mode that represents every address in `history` losslessly.
    ///
    /// `history[0]` is the trigger. Returns `None` if even `Wide` cannot hold the history.
    pub fn best_fit(history: &[LineAddr]) -> Option<Self> {
        let trigger = *history.first()?;
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|mode| history.iter().all(|&a| mode.fits(trigger, a)))
    }
}

/// 512-bit packed slot storage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload(pub [u64; PAYLOAD_WORDS]);

impl Payload {
    /// Reads slot `index` of width `width`.
    pub fn slot(&self, index: usize, width: u32) -> u64 {
        let width = width as usize;
        let start = index * width;
        debug_assert!(start + width <= PAYLOAD_BITS, "payload slot out of range");
        let word = start / 64;
        let shift = start % 64;
        let mut value = self.0[word] >> shift;
        if shift + width > 64 {
            value |= self.0[word + 1] << (64 - shift);
        }
        value & low_mask(width)
    }

    /// Writes `value` into slot `index` of width `width`.
    pub fn set_slot(&mut self, index: usize, width: u32, value: u64) {
        let width = width as usize;
        let start = index * width;
        debug_assert!(start + width <= PAYLOAD_BITS, "payload slot out of range");
        let value = value & low_mask(width);
        let word = start / 64;
        let shift = start % 64;
        self.0[word] &= !(low_mask(width) << shift);
        self.0[word] |= value << shift;
        if shift + width > 64 {
            let spill = 64 - shift;
            self.0[word + 1] &= !(low_mask(width) >> spill);
            self.0[word + 1] |= value >> spill;
        }
    }
}

const fn low_mask(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// A closed recording session in its stored form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedRecord {
    /// Packed slots.
    pub payload: Payload,
    /// Encoding used for `payload`.
    pub mode: CompressionMode,
    /// Slots in use, trigger included.
    pub len: usize,
    /// Session anchor.
    pub trigger: Trigger,
}

impl CompressedRecord {
    /// Compresses `history` under `mode`.
    ///
    /// At most `mode.capacity()` entries are kept. Entries outside `mode`'s reach are stored
    /// truncated; pick `mode` with [`CompressionMode::best_fit`].
    pub fn compress(trigger: Trigger, history: &[LineAddr], mode: CompressionMode) -> Self {
        let len = history.len().min(mode.capacity());
        let mut payload = Payload::default();
        for (i, addr) in history[..len].iter().enumerate() {
            payload.set_slot(i, mode.width(), addr.low_bits(mode.width()));
        }
        Self {
            payload,
            mode,
            len,
            trigger,
        }
    }

    /// Restores the address in slot `index`.
    pub fn address(&self, index: usize) -> LineAddr {
        let width = self.mode.width();
        self.trigger
            .addr
            .splice_low(width, self.payload.slot(index, width))
    }

    /// Restores every address, trigger first.
    pub fn addresses(&self) -> impl Iterator<Item = LineAddr> + '_ {
        (0..self.len).map(|i| self.address(i))
    }

    /// Number of addresses a replay emits (everything but the trigger).
    pub const fn replay_len(&self) -> usize {
        self.len.saturating_sub(1)
    }
}
