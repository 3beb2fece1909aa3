//! Associative Trigger Table.
//!
//! A fixed set-associative index from a hashed trigger line address to `{valid, tag}`. It
//! provides:
//! 1. **Lookup:** A pure read of every way of one set, available every tick.
//! 2. **Write port:** At most one write per tick, committed at end of tick, so a lookup
//!    in the same tick observes the pre-write contents.
//! 3. **Replacement:** Victim selection through a pluggable [`ReplacementPolicy`].
//! 4. **Reset gating:** Until the reset sweep marks the table ready, every lookup misses.
//!
//! Storage is one flat arena indexed by `set * ways + way`.

use crate::common::addr::LineAddr;
use crate::common::constants::MAX_WAYS;
use crate::config::ReplacementPolicy as PolicyType;
use crate::prefetch::policies::{self, ReplacementPolicy};

/// One trigger table slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TriggerEntry {
    /// Slot holds a trigger.
    pub valid: bool,
    /// Stored tag bits.
    pub tag: u64,
}

/// Copy of every way of one set, as returned by a lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetView {
    entries: [TriggerEntry; MAX_WAYS],
    ways: usize,
}

impl SetView {
    /// Returns the ways of the set.
    pub fn entries(&self) -> &[TriggerEntry] {
        &self.entries[..self.ways]
    }

    /// Returns the way holding a valid entry with `tag`, if any.
    pub fn find(&self, tag: u64) -> Option<usize> {
        self.entries().iter().position(|e| e.valid && e.tag == tag)
    }

    /// Returns true when every way holds a valid entry.
    pub fn is_full(&self) -> bool {
        self.entries().iter().all(|e| e.valid)
    }
}

/// Ways targeted by a write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaySelect {
    /// A single way.
    One(usize),
    /// Every way of the set (used by the reset sweep).
    All,
}

/// A pending write on the table's single write port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableWrite {
    /// Target set.
    pub set: usize,
    /// Target way(s).
    pub ways: WaySelect,
    /// Value written.
    pub entry: TriggerEntry,
}

impl TableWrite {
    /// Builds a write that invalidates a whole set.
    pub const fn invalidate_set(set: usize) -> Self {
        Self {
            set,
            ways: WaySelect::All,
            entry: TriggerEntry {
                valid: false,
                tag: 0,
            },
        }
    }

    /// Builds a write that installs `tag` in one way.
    pub const fn install(set: usize, way: usize, tag: u64) -> Self {
        Self {
            set,
            ways: WaySelect::One(way),
            entry: TriggerEntry { valid: true, tag },
        }
    }
}

/// Set-associative trigger table.
#[derive(Debug)]
pub struct TriggerTable {
    entries: Vec<TriggerEntry>,
    sets: usize,
    ways: usize,
    set_bits: u32,
    tag_mask: u64,
    policy: Box<dyn ReplacementPolicy>,
    pending: Option<TableWrite>,
    ready: bool,
}

impl TriggerTable {
    /// Creates a table.
    ///
    /// `sets` is rounded up to a power of two and `ways` clamped to `1..=MAX_WAYS`. The table
    /// starts not ready; only the reset sweep makes it ready.
    ///
    /// # Arguments
    ///
    /// * `sets` - Number of sets.
    /// * `ways` - Associativity.
    /// * `tag_bits` - Stored tag width; 64 or more keeps the whole upper address.
    /// * `policy` - Victim selection algorithm.
    pub fn new(sets: usize, ways: usize, tag_bits: u32, policy: PolicyType) -> Self {
        let sets = sets.max(1).next_power_of_two();
        let ways = ways.clamp(1, MAX_WAYS);
        let tag_mask = if tag_bits >= 64 {
            u64::MAX
        } else {
            (1u64 << tag_bits.max(1)) - 1
        };
        Self {
            entries: vec![TriggerEntry::default(); sets * ways],
            sets,
            ways,
            set_bits: sets.trailing_zeros(),
            tag_mask,
            policy: policies::build(policy, sets, ways),
            pending: None,
            ready: false,
        }
    }

    /// Replaces the victim selection policy.
    pub fn with_policy(mut self, policy: Box<dyn ReplacementPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Number of sets.
    pub const fn sets(&self) -> usize {
        self.sets
    }

    /// Ways per set.
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Splits a trigger line address into `(tag, set)`.
    ///
    /// The set index folds the low tag bits into the low address bits so that strided
    /// triggers spread across sets.
    pub fn index(&self, addr: LineAddr) -> (u64, usize) {
        let line = addr.val();
        let set_mask = (self.sets - 1) as u64;
        let upper = line.checked_shr(self.set_bits).unwrap_or(0);
        let set = ((line ^ upper) & set_mask) as usize;
        (upper & self.tag_mask, set)
    }

    /// Reads every way of `set`.
    ///
    /// Pending writes are not visible until [`commit`](Self::commit). Before the table is
    /// marked ready every way reads as invalid.
    pub fn lookup(&self, set: usize) -> SetView {
        let mut view = SetView {
            entries: [TriggerEntry::default(); MAX_WAYS],
            ways: self.ways,
        };
        if self.ready {
            let base = set * self.ways;
            view.entries[..self.ways].copy_from_slice(&self.entries[base..base + self.ways]);
        }
        view
    }

    /// Returns the committed entry at `(set, way)` regardless of readiness.
    pub fn entry(&self, set: usize, way: usize) -> TriggerEntry {
        self.entries[set * self.ways + way]
    }

    /// Returns the way of `set` whose committed entry is valid with `tag`.
    pub fn find(&self, set: usize, tag: u64) -> Option<usize> {
        let base = set * self.ways;
        self.entries[base..base + self.ways]
            .iter()
            .position(|e| e.valid && e.tag == tag)
    }

    /// Asks the replacement policy for a victim way in `set`.
    pub fn victim(&mut self, set: usize) -> usize {
        self.policy.get_victim(set).min(self.ways - 1)
    }

    /// Picks the way a new trigger is installed in at write-back.
    ///
    /// `reserved` is the way chosen when the trigger was looked up. Another trigger of the
    /// same set may have been installed there since, so the reserved way is only kept while
    /// it is still free. Otherwise the first free way is used, and a full set asks the
    /// policy for a fresh victim.
    ///
    /// # Arguments
    ///
    /// * `set` - Set the trigger indexes to.
    /// * `reserved` - Way chosen by the lookup.
    pub fn placement(&mut self, set: usize, reserved: usize) -> usize {
        let base = set * self.ways;
        let ways = &self.entries[base..base + self.ways];
        if ways.get(reserved).is_some_and(|e| !e.valid) {
            return reserved;
        }
        match ways.iter().position(|e| !e.valid) {
            Some(free) => free,
            None => self.victim(set),
        }
    }

    /// Informs the replacement policy that `(set, way)` was hit.
    pub fn touch(&mut self, set: usize, way: usize) {
        self.policy.update(set, way);
    }

    /// Returns true if the write port is still free this tick.
    pub const fn write_ready(&self) -> bool {
        self.pending.is_none()
    }

    /// Drives the write port for this tick.
    ///
    /// # Panics
    ///
    /// Panics if a write was already issued this tick: the table has a single writer.
    pub fn write(&mut self, write: TableWrite) {
        assert!(
            self.pending.is_none(),
            "trigger table write port driven twice in one tick"
        );
        self.pending = Some(write);
    }

    /// Commits the pending write, if any. Called once at the end of every tick.
    pub fn commit(&mut self) {
        let Some(write) = self.pending.take() else {
            return;
        };
        let base = write.set * self.ways;
        match write.ways {
            WaySelect::All => {
                self.entries[base..base + self.ways].fill(write.entry);
            }
            WaySelect::One(way) => {
                self.entries[base + way] = write.entry;
                if write.entry.valid {
                    self.policy.update(write.set, way);
                }
            }
        }
    }

    /// Returns true once the reset sweep has completed.
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Sets the reset gate.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Number of committed valid entries in `set`.
    pub fn occupancy(&self, set: usize) -> usize {
        let base = set * self.ways;
        self.entries[base..base + self.ways]
            .iter()
            .filter(|e| e.valid)
            .count()
    }
}
