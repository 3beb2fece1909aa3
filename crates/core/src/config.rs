//! Configuration system for the temporal prefetch engine.
//!
//! This module defines all configuration structures used to parameterize the engine. It provides:
//! 1. **Defaults:** Baseline table geometry, queue depths and knob values.
//! 2. **Structures:** Hierarchical config for the trigger table, line geometry, queues,
//!    live knobs and the reference metadata store.
//! 3. **Live knobs:** [`SharedKnobs`], an externally mutable handle read at the start of every tick.
//!
//! Configuration is supplied as JSON (`Config::from_json` / `Config::load`) or built with
//! `Config::default()`.

use std::fs;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::common::constants::{MAX_RECORD_LEN, MAX_WAYS};
use crate::common::error::ConfigError;

/// Default configuration constants for the engine.
mod defaults {
    /// Trigger table sets (16K entries at 16 ways).
    pub const TABLE_SETS: usize = 1024;

    /// Trigger table associativity.
    pub const TABLE_WAYS: usize = 16;

    /// Stored tag width in bits.
    pub const TAG_BITS: u32 = 20;

    /// log2 of the cache line size (64-byte lines).
    pub const BLOCK_OFFSET_BITS: u32 = 6;

    /// L2 slice set bits used to split emitted prefetches into tag and set.
    pub const CACHE_SET_BITS: u32 = 9;

    /// Training intake depth (one event accepted per tick).
    pub const TRAIN_DEPTH: usize = 1;

    /// Pending triggers awaiting the recorder.
    pub const TRIGGER_DEPTH: usize = 4;

    /// Outbound metadata read requests.
    pub const META_READ_DEPTH: usize = 4;

    /// Outbound metadata write requests.
    pub const META_WRITE_DEPTH: usize = 2;

    /// Inbound metadata responses.
    pub const META_RESPONSE_DEPTH: usize = 4;

    /// Minimum ticks between two prefetch emissions.
    pub const THROTTLE_CYCLES: u32 = 4;

    /// Triggers outstanding (queued + recording) below which misses start new triggers.
    pub const TRIGGER_ENQUEUE_THRESHOLD: usize = 1;

    /// Addresses captured per record, trigger included.
    pub const RECORD_LENGTH: usize = 16;

    /// Response latency of the reference metadata store in ticks.
    pub const STORE_LATENCY: u64 = 20;

    /// Requests the reference metadata store keeps in flight.
    pub const STORE_CAPACITY: usize = 8;
}

/// Trigger table victim selection algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ReplacementPolicy {
    /// Uniform pseudo-random victim.
    #[default]
    Random,
    /// Least recently used way.
    #[serde(alias = "LRU")]
    Lru,
    /// Round-robin per set.
    #[serde(alias = "FIFO")]
    Fifo,
}

/// Trigger table geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Number of sets (power of two).
    pub sets: usize,
    /// Ways per set.
    pub ways: usize,
    /// Stored tag width in bits.
    pub tag_bits: u32,
    /// Victim selection policy.
    pub policy: ReplacementPolicy,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            sets: defaults::TABLE_SETS,
            ways: defaults::TABLE_WAYS,
            tag_bits: defaults::TAG_BITS,
            policy: ReplacementPolicy::default(),
        }
    }
}

/// Cache line geometry shared with the surrounding cache slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    /// log2 of the line size in bytes.
    pub block_offset_bits: u32,
    /// Set-index bits of the cache slice that receives prefetches.
    pub cache_set_bits: u32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            block_offset_bits: defaults::BLOCK_OFFSET_BITS,
            cache_set_bits: defaults::CACHE_SET_BITS,
        }
    }
}

/// Depths of every bounded queue in the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Training intake queue.
    pub train_depth: usize,
    /// Trigger queue.
    pub trigger_depth: usize,
    /// Metadata read request queue.
    pub meta_read_depth: usize,
    /// Metadata write request queue.
    pub meta_write_depth: usize,
    /// Metadata response buffer. Reads are credited against it.
    pub meta_response_depth: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            train_depth: defaults::TRAIN_DEPTH,
            trigger_depth: defaults::TRIGGER_DEPTH,
            meta_read_depth: defaults::META_READ_DEPTH,
            meta_write_depth: defaults::META_WRITE_DEPTH,
            meta_response_depth: defaults::META_RESPONSE_DEPTH,
        }
    }
}

/// Live-tunable engine knobs.
///
/// These may change between any two ticks; the engine takes a copy at the start of each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefetchKnobs {
    /// Master enable. When clear, training is ignored and replay pauses.
    pub enable: bool,
    /// Minimum ticks between two prefetch emissions.
    pub throttle_cycles: u32,
    /// A trigger table hit starts a new recording for the same trigger.
    pub hit_as_trigger: bool,
    /// Outstanding-trigger count below which any event starts a new trigger.
    pub trigger_enqueue_threshold: usize,
    /// Addresses captured per record, trigger included.
    pub record_length: usize,
    /// Train on the virtual address instead of the physical one.
    pub train_on_vaddr: bool,
    /// Accept training events whose request was itself a prefetch.
    pub train_on_prefetch: bool,
}

impl Default for PrefetchKnobs {
    fn default() -> Self {
        Self {
            enable: true,
            throttle_cycles: defaults::THROTTLE_CYCLES,
            hit_as_trigger: true,
            trigger_enqueue_threshold: defaults::TRIGGER_ENQUEUE_THRESHOLD,
            record_length: defaults::RECORD_LENGTH,
            train_on_vaddr: false,
            train_on_prefetch: false,
        }
    }
}

/// Shared, externally mutable handle to the live knobs.
///
/// Cloning yields another handle to the same knobs; a control plane holds one clone and the
/// engine holds another.
#[derive(Debug, Clone, Default)]
pub struct SharedKnobs(Arc<RwLock<PrefetchKnobs>>);

impl SharedKnobs {
    /// Wraps an initial knob set.
    pub fn new(knobs: PrefetchKnobs) -> Self {
        Self(Arc::new(RwLock::new(knobs)))
    }

    /// Returns a copy of the current knob values.
    pub fn snapshot(&self) -> PrefetchKnobs {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies an in-place update to the knobs.
    pub fn update(&self, f: impl FnOnce(&mut PrefetchKnobs)) {
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}

/// Reference metadata store model parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Ticks from request acceptance to response availability.
    pub latency: u64,
    /// Requests in flight before the store stops accepting.
    pub capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            latency: defaults::STORE_LATENCY,
            capacity: defaults::STORE_CAPACITY,
        }
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use tpsim_core::config::{Config, ReplacementPolicy};
///
/// let json = r#"{
///     "table": { "sets": 64, "ways": 4, "policy": "Lru" },
///     "knobs": { "throttle_cycles": 2, "record_length": 8 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.table.sets, 64);
/// assert_eq!(config.table.policy, ReplacementPolicy::Lru);
/// assert_eq!(config.knobs.record_length, 8);
/// assert_eq!(config.queues.trigger_depth, 4);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identifier stamped on metadata requests and matched on responses.
    pub owner_id: u32,
    /// Trigger table geometry.
    pub table: TableConfig,
    /// Line geometry.
    pub line: LineConfig,
    /// Queue depths.
    pub queues: QueueConfig,
    /// Initial live knob values.
    pub knobs: PrefetchKnobs,
    /// Reference metadata store model.
    pub store: StoreConfig,
}

impl Config {
    /// Parses and validates a configuration from JSON text.
    ///
    /// Missing sections and fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or the first validation failure.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_json`](Self::from_json).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Checks that the configuration describes a buildable engine.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] variant naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.table.sets.is_power_of_two() {
            return Err(ConfigError::SetsNotPowerOfTwo(self.table.sets));
        }
        if self.table.ways == 0 || self.table.ways > MAX_WAYS {
            return Err(ConfigError::WaysOutOfRange {
                got: self.table.ways,
                max: MAX_WAYS,
            });
        }
        if self.table.tag_bits == 0 || self.table.tag_bits > 64 {
            return Err(ConfigError::TagBitsOutOfRange(self.table.tag_bits));
        }
        if self.line.block_offset_bits >= 64 {
            return Err(ConfigError::BlockOffsetOutOfRange(self.line.block_offset_bits));
        }
        if self.line.cache_set_bits >= 64 {
            return Err(ConfigError::CacheSetBitsOutOfRange(self.line.cache_set_bits));
        }

        let q = &self.queues;
        for (name, depth) in [
            ("train_depth", q.train_depth),
            ("trigger_depth", q.trigger_depth),
            ("meta_read_depth", q.meta_read_depth),
            ("meta_write_depth", q.meta_write_depth),
            ("meta_response_depth", q.meta_response_depth),
        ] {
            if depth == 0 {
                return Err(ConfigError::ZeroDepth(name));
            }
        }
        if q.meta_response_depth < q.meta_read_depth {
            return Err(ConfigError::ResponseBufferTooSmall {
                response: q.meta_response_depth,
                read: q.meta_read_depth,
            });
        }

        let len = self.knobs.record_length;
        if !(2..=MAX_RECORD_LEN).contains(&len) {
            return Err(ConfigError::RecordLengthOutOfRange {
                got: len,
                max: MAX_RECORD_LEN,
            });
        }
        Ok(())
    }
}
