//! Temporal prefetch engine model.
//!
//! This crate implements a cycle-driven model of a temporal (trigger-replay) L2 prefetcher:
//! 1. **Training:** A 3-stage lookup pipeline probes a set-associative trigger table.
//! 2. **Recording:** A single recorder captures the address stream that follows a trigger and
//!    compresses it into one of four fixed-width encodings.
//! 3. **Metadata:** Compressed records travel to an external key-value store over an
//!    asynchronous request/response protocol.
//! 4. **Replay:** A trigger recurrence reads the record back and replays it as throttled prefetches.
//! 5. **Simulation:** A reference metadata store, a trace loader, and a trace-driven simulator.

/// Common types and constants (line addresses, payload geometry, errors).
pub mod common;
/// Engine configuration (defaults, live-tunable knobs, JSON loading).
pub mod config;
/// The temporal prefetch engine and its units.
pub mod prefetch;
/// Trace-driven simulation harness and the reference metadata store.
pub mod sim;
/// Prefetch engine statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The engine itself; construct with `TemporalPrefetcher::new`.
pub use crate::prefetch::TemporalPrefetcher;
/// Trace-driven simulator wiring the engine to a metadata store.
pub use crate::sim::Simulator;
