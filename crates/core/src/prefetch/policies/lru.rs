//! Least Recently Used (LRU) Replacement Policy.
//!
//! Keeps a recency stack per set: index 0 is the most recently touched way, the last
//! index is the victim. A trigger that keeps recurring therefore stays resident while
//! one-off triggers age out.
//!
//! Installs count as uses, so a freshly recorded trigger gets a full trip down the stack
//! before it can be chosen, even if it never recurs.
//!
//! - `update()`: O(W)
//! - `get_victim()`: O(1)

use super::ReplacementPolicy;

/// LRU policy state.
#[derive(Debug)]
pub struct LruPolicy {
    /// One recency stack per set, MRU first.
    usage: Vec<Vec<usize>>,
}

impl LruPolicy {
    /// Creates an LRU policy with every set ordered `[0, 1, .., ways - 1]`.
    ///
    /// # Arguments
    ///
    /// * `sets` - Number of trigger table sets.
    /// * `ways` - Ways per set.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            usage: (0..sets).map(|_| (0..ways.max(1)).collect()).collect(),
        }
    }
}

impl ReplacementPolicy for LruPolicy {
    fn update(&mut self, set: usize, way: usize) {
        let stack = &mut self.usage[set];
        if let Some(pos) = stack.iter().position(|&w| w == way) {
            let _ = stack.remove(pos);
        }
        stack.insert(0, way);
    }

    fn get_victim(&mut self, set: usize) -> usize {
        self.usage[set].last().copied().unwrap_or(0)
    }
}
