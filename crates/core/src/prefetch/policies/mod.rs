//! Trigger table replacement policies.
//!
//! A policy is consulted only after every way of the probed set reported a tag mismatch.
//! Any policy returning a way index inside the set is valid; reproducibility across runs is
//! not required.
//!
//! # Policies
//!
//! - `Random`: xorshift pseudo-random victim (default).
//! - `Lru`: Least Recently Used.
//! - `Fifo`: Round-robin per set.

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Least Recently Used replacement policy.
pub mod lru;

/// Random replacement policy.
pub mod random;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;
pub use random::RandomPolicy;

use crate::config::ReplacementPolicy as PolicyType;

/// Trait for trigger table victim selection.
pub trait ReplacementPolicy: Send + Sync + std::fmt::Debug {
    /// Records that `way` of `set` was hit or (re)written.
    fn update(&mut self, set: usize, way: usize);

    /// Selects the way of `set` to overwrite with a new trigger.
    fn get_victim(&mut self, set: usize) -> usize;
}

/// Builds the policy selected by the configuration.
pub fn build(kind: PolicyType, sets: usize, ways: usize) -> Box<dyn ReplacementPolicy> {
    match kind {
        PolicyType::Random => Box::new(RandomPolicy::new(sets, ways)),
        PolicyType::Lru => Box::new(LruPolicy::new(sets, ways)),
        PolicyType::Fifo => Box::new(FifoPolicy::new(sets, ways)),
    }
}
