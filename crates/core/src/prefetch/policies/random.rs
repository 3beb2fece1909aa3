//! Random Replacement Policy.
//!
//! Picks the victim way with a xorshift64 generator. Usage history is ignored, so a trigger
//! that is hit constantly is as likely to be evicted as a cold one.

use super::ReplacementPolicy;

/// Random policy state.
#[derive(Debug)]
pub struct RandomPolicy {
    ways: usize,
    state: u64,
}

impl RandomPolicy {
    /// Seed used when none is supplied.
    pub const DEFAULT_SEED: u64 = 0x2545_F491_4F6C_DD1D;

    /// Creates a random policy for a table with `ways` ways per set.
    pub fn new(_sets: usize, ways: usize) -> Self {
        Self::with_seed(ways, Self::DEFAULT_SEED)
    }

    /// Creates a random policy with an explicit seed.
    ///
    /// # Arguments
    ///
    /// * `ways` - Ways per set.
    /// * `seed` - Generator state; zero is replaced by [`Self::DEFAULT_SEED`].
    pub fn with_seed(ways: usize, seed: u64) -> Self {
        Self {
            ways: ways.max(1),
            state: if seed == 0 { Self::DEFAULT_SEED } else { seed },
        }
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn update(&mut self, _set: usize, _way: usize) {}

    fn get_victim(&mut self, _set: usize) -> usize {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x % self.ways as u64) as usize
    }
}
