//! Simulation harness tests.

pub mod store;
