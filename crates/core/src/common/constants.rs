//! Engine-wide constants.
//!
//! These bound the fixed-size arrays used by the trigger table snapshots, the recorder
//! buffer and the compressed payload.

/// Width of a compressed record payload in bits.
pub const PAYLOAD_BITS: usize = 512;

/// Number of 64-bit words backing a payload.
pub const PAYLOAD_WORDS: usize = PAYLOAD_BITS / 64;

/// Size of a payload in bytes on the metadata wire.
pub const PAYLOAD_BYTES: usize = PAYLOAD_BITS / 8;

/// Largest supported trigger table associativity.
pub const MAX_WAYS: usize = 32;

/// Largest number of addresses (trigger included) a single record can hold.
///
/// Equal to the capacity of the narrowest compression mode.
pub const MAX_RECORD_LEN: usize = 25;
