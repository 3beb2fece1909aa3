//! Engine unit tests.

pub mod lookup;
pub mod queue;
pub mod recorder;
pub mod table;
