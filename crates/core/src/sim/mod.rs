//! Simulation harness.
//!
//! Provides a reference metadata store, a prefetch sink, a trace loader and a simulator
//! that wires them to the engine.

/// Prefetch sink.
pub mod port;

/// Top-level simulator.
pub mod simulator;

/// Fixed-latency metadata store.
pub mod store;

/// JSON-lines trace loader.
pub mod trace;

pub use self::port::{IssuedPrefetch, PrefetchLog};
pub use self::simulator::{SimReport, Simulator};
pub use self::store::LatencyMetadataStore;
pub use self::trace::{load_trace, parse_trace};
