//! Common utilities and types shared by the prefetch engine and the simulator.
//!
//! 1. **Address Types:** A strong type for cache-line addresses.
//! 2. **Constants:** Payload geometry and fixed array bounds.
//! 3. **Error Handling:** Recoverable configuration and trace errors.

/// Cache-line address type.
pub mod addr;

/// Engine-wide constants.
pub mod constants;

/// Error types for configuration and trace loading.
pub mod error;

pub use addr::LineAddr;
pub use constants::{MAX_RECORD_LEN, MAX_WAYS, PAYLOAD_BITS, PAYLOAD_WORDS};
pub use error::{ConfigError, TraceError};
