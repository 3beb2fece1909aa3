//! Shared test infrastructure.

/// `TestContext` and address helpers.
pub mod harness;
