//! Error definitions.
//!
//! The engine itself has no error return path: unmet preconditions are silent no-ops and
//! broken capacity guarantees are fatal assertions. The types here cover the recoverable
//! edges around it, namely configuration loading and trace parsing.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Configuration failed to load or describes an unbuildable engine.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration text is not valid JSON for `Config`.
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Trigger table set count must be a non-zero power of two.
    #[error("table.sets must be a non-zero power of two (got {0})")]
    SetsNotPowerOfTwo(usize),

    /// Trigger table associativity is outside the supported range.
    #[error("table.ways must be in 1..={max} (got {got})")]
    WaysOutOfRange {
        /// Requested associativity.
        got: usize,
        /// Largest supported associativity.
        max: usize,
    },

    /// Tag width cannot be zero or exceed a 64-bit line address.
    #[error("table.tag_bits must be in 1..=64 (got {0})")]
    TagBitsOutOfRange(u32),

    /// The line offset must leave at least one address bit.
    #[error("line.block_offset_bits must be below 64 (got {0})")]
    BlockOffsetOutOfRange(u32),

    /// The prefetch target's set-index width must fit a line address.
    #[error("line.cache_set_bits must be below 64 (got {0})")]
    CacheSetBitsOutOfRange(u32),

    /// A queue was configured with zero depth.
    #[error("queues.{0} must be at least 1")]
    ZeroDepth(&'static str),

    /// The metadata response buffer cannot cover every outstanding read.
    #[error("queues.meta_response_depth ({response}) must be >= queues.meta_read_depth ({read})")]
    ResponseBufferTooSmall {
        /// Response buffer depth.
        response: usize,
        /// Read request queue depth.
        read: usize,
    },

    /// Record length cannot hold the trigger plus at least one follower.
    #[error("knobs.record_length must be in 2..={max} (got {got})")]
    RecordLengthOutOfRange {
        /// Requested record length.
        got: usize,
        /// Largest supported record length.
        max: usize,
    },
}

/// A training trace could not be loaded.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace file could not be opened or read.
    #[error("cannot read trace {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// One line of the trace is not a valid train event.
    #[error("trace line {line}: {source}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
