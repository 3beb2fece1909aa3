//! Sender / Replay Engine.
//!
//! Replays one compressed record as a train of prefetches. Slot 0 is the trigger and is
//! never replayed. At most one emission leaves per `throttle_cycles` ticks, and a replay
//! cannot be interrupted or overlapped by another.

use crate::common::addr::LineAddr;
use crate::prefetch::compress::CompressedRecord;

/// Mutable replay state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SenderSession {
    /// Record being replayed.
    pub record: CompressedRecord,
    /// Next slot to emit.
    pub cursor: usize,
    /// Ticks left before the next emission is allowed.
    pub throttle: u32,
}

/// One emitted replay address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Emission {
    /// Restored line address.
    pub addr: LineAddr,
    /// Slot it came from.
    pub index: usize,
    /// This was the last slot of the record.
    pub last: bool,
}

/// Single-session replay engine.
#[derive(Debug, Default)]
pub struct Sender {
    session: Option<SenderSession>,
}

impl Sender {
    /// Creates an idle sender.
    pub const fn new() -> Self {
        Self { session: None }
    }

    /// Returns true while a replay is in progress.
    pub const fn is_busy(&self) -> bool {
        self.session.is_some()
    }

    /// Current replay state.
    pub const fn session(&self) -> Option<&SenderSession> {
        self.session.as_ref()
    }

    /// Takes ownership of `record` and starts replaying from slot 1.
    ///
    /// Returns false (and stays idle) if the record holds nothing beyond its trigger.
    ///
    /// # Panics
    ///
    /// Panics if a replay is already in progress.
    pub fn start(&mut self, record: CompressedRecord) -> bool {
        assert!(self.session.is_none(), "sender started during a replay");
        if record.replay_len() == 0 {
            return false;
        }
        self.session = Some(SenderSession {
            record,
            cursor: 1,
            throttle: 0,
        });
        true
    }

    /// Advances the replay by one tick.
    ///
    /// `ready` is the consumer's readiness this tick. Returns the address to prefetch, if an
    /// emission is due and the consumer can take it.
    pub fn tick(&mut self, throttle_cycles: u32, ready: bool) -> Option<Emission> {
        let session = self.session.as_mut()?;
        session.throttle = session.throttle.saturating_sub(1);
        if session.throttle > 0 || !ready {
            return None;
        }

        let index = session.cursor;
        let addr = session.record.address(index);
        session.cursor += 1;
        session.throttle = throttle_cycles;
        let last = session.cursor >= session.record.len;
        if last {
            self.session = None;
        }
        Some(Emission { addr, index, last })
    }

    /// Drops the replay in progress.
    pub fn abort(&mut self) {
        self.session = None;
    }
}
