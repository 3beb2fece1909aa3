//! Recorder.
//!
//! Captures the line addresses that follow a trigger. There is exactly one recording
//! session at a time:
//! 1. **Start:** A trigger dequeued from the trigger queue opens a session; slot 0 holds it.
//! 2. **Append:** Each recorded address advances the cursor and re-evaluates the best mode
//!    over the whole history.
//! 3. **Close:** When the cursor reaches the record length or the mode's capacity, the
//!    history is compressed and parked until the write-back path takes it.

use crate::common::addr::LineAddr;
use crate::common::constants::MAX_RECORD_LEN;
use crate::prefetch::compress::{CompressedRecord, CompressionMode};
use crate::prefetch::types::Trigger;

/// Result of offering an address to the recorder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Append {
    /// No session is open.
    Idle,
    /// The address is too far from the trigger for any mode and was not recorded.
    Skipped,
    /// The address was recorded; the session stays open.
    Recorded,
    /// The address was recorded and closed the session.
    Closed,
}

/// Single-session recorder.
#[derive(Debug)]
pub struct Recorder {
    buffer: [LineAddr; MAX_RECORD_LEN],
    cursor: usize,
    mode: CompressionMode,
    trigger: Option<Trigger>,
    finished: Option<CompressedRecord>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    /// Creates an idle recorder.
    pub const fn new() -> Self {
        Self {
            buffer: [LineAddr(0); MAX_RECORD_LEN],
            cursor: 0,
            mode: CompressionMode::Tiny,
            trigger: None,
            finished: None,
        }
    }

    /// Returns true while a session is open.
    pub const fn is_active(&self) -> bool {
        self.trigger.is_some()
    }

    /// Returns true while a closed record waits for write-back.
    pub const fn has_finished(&self) -> bool {
        self.finished.is_some()
    }

    /// Returns true if a new session may open this tick.
    pub const fn can_start(&self) -> bool {
        self.trigger.is_none() && self.finished.is_none()
    }

    /// Trigger of the open session.
    pub const fn trigger(&self) -> Option<Trigger> {
        self.trigger
    }

    /// Addresses recorded so far, trigger included.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Mode that currently fits the whole history.
    pub const fn mode(&self) -> CompressionMode {
        self.mode
    }

    /// Opens a session anchored on `trigger`.
    ///
    /// # Panics
    ///
    /// Panics if a session is open or a closed record is still parked.
    pub fn start(&mut self, trigger: Trigger) {
        assert!(
            self.can_start(),
            "recorder started while a session is open or a record awaits write-back"
        );
        self.buffer[0] = trigger.addr;
        self.cursor = 1;
        self.mode = CompressionMode::Tiny;
        self.trigger = Some(trigger);
    }

    /// Offers the next observed address to the open session.
    ///
    /// `record_length` is clamped to `2..=MAX_RECORD_LEN`.
    pub fn append(&mut self, addr: LineAddr, record_length: usize) -> Append {
        let Some(trigger) = self.trigger else {
            return Append::Idle;
        };
        if !CompressionMode::Wide.fits(trigger.addr, addr) {
            return Append::Skipped;
        }

        self.buffer[self.cursor] = addr;
        self.cursor += 1;
        self.mode =
            CompressionMode::best_fit(&self.buffer[..self.cursor]).unwrap_or(CompressionMode::Wide);

        let limit = record_length
            .clamp(2, MAX_RECORD_LEN)
            .min(self.mode.capacity());
        if self.cursor < limit {
            return Append::Recorded;
        }

        self.finished = Some(CompressedRecord::compress(
            trigger,
            &self.buffer[..self.cursor],
            self.mode,
        ));
        self.trigger = None;
        self.cursor = 0;
        Append::Closed
    }

    /// Returns the parked record without taking it.
    pub const fn peek_finished(&self) -> Option<&CompressedRecord> {
        self.finished.as_ref()
    }

    /// Hands the parked record to the write-back path.
    pub fn take_finished(&mut self) -> Option<CompressedRecord> {
        self.finished.take()
    }

    /// Drops the open session and any parked record.
    pub fn abort(&mut self) {
        self.trigger = None;
        self.finished = None;
        self.cursor = 0;
    }
}
