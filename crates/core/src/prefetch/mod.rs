//! Temporal prefetch engine.
//!
//! This module contains the engine and the units it is built from. A trigger address
//! that recurs replays the line addresses that followed it last time.

/// Record compression modes and the packed payload.
pub mod compress;

/// The engine: per-tick orchestration of every unit.
pub mod engine;

/// Three-stage lookup pipeline and the S2 decision.
pub mod lookup;

/// Metadata store request arbitration and response buffering.
pub mod metadata;

/// Trigger table replacement policies.
pub mod policies;

/// Bounded FIFO used between units.
pub mod queue;

/// Single-session recorder.
pub mod recorder;

/// Trigger table reset sweep.
pub mod reset;

/// Throttled replay of compressed records.
pub mod sender;

/// Set-associative trigger table.
pub mod table;

/// Boundary types exchanged with the cache slice.
pub mod types;

pub use self::compress::{CompressedRecord, CompressionMode};
pub use self::engine::TemporalPrefetcher;
pub use self::metadata::{MetaRequest, MetaResponse, MetadataChannel, MetadataPort};
pub use self::table::TriggerTable;
pub use self::types::{
    PfSource, PrefetchPort, PrefetchRequest, PrefetchResponse, TrainEvent, TrainSource, Trigger,
};
