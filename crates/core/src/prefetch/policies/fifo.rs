//! First-In, First-Out (FIFO) Replacement Policy.
//!
//! One round-robin pointer per set. The pointer only moves when the way it names is
//! written, so triggers are evicted in the order they were installed.
//!
//! Hits do not move the pointer. A trigger table sees far more lookups than installs, and
//! ignoring hits keeps the per-set state to one counter at the price of evicting a hot
//! trigger once its turn comes round.

use super::ReplacementPolicy;

/// FIFO policy state.
#[derive(Debug)]
pub struct FifoPolicy {
    next_way: Vec<usize>,
    ways: usize,
}

impl FifoPolicy {
    /// Creates a FIFO policy with every pointer at way 0.
    ///
    /// # Arguments
    ///
    /// * `sets` - Number of trigger table sets.
    /// * `ways` - Ways per set.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            next_way: vec![0; sets],
            ways: ways.max(1),
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn update(&mut self, set: usize, way: usize) {
        if self.next_way[set] == way {
            self.next_way[set] = (way + 1) % self.ways;
        }
    }

    fn get_victim(&mut self, set: usize) -> usize {
        self.next_way[set]
    }
}
