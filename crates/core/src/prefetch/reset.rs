//! Reset Sequencer.
//!
//! Sweeps the trigger table through its own write port, invalidating one whole set per
//! tick. Until the sweep completes the table reports every lookup as a miss.

use crate::prefetch::table::TableWrite;

/// Reset sweep state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResetSequencer {
    next_set: usize,
    sets: usize,
}

impl ResetSequencer {
    /// Creates a sequencer for `sets` sets, armed to sweep from set 0.
    pub const fn new(sets: usize) -> Self {
        Self { next_set: 0, sets }
    }

    /// Returns true once every set has been invalidated.
    pub const fn is_done(&self) -> bool {
        self.next_set >= self.sets
    }

    /// Sets already swept.
    pub const fn progress(&self) -> usize {
        self.next_set
    }

    /// Re-arms the sweep from set 0.
    pub fn restart(&mut self) {
        self.next_set = 0;
    }

    /// Produces this tick's invalidation, if the sweep is still running.
    pub fn tick(&mut self) -> Option<TableWrite> {
        if self.is_done() {
            return None;
        }
        let write = TableWrite::invalidate_set(self.next_set);
        self.next_set += 1;
        Some(write)
    }
}
