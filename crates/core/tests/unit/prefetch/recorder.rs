//! Recorder Tests.
//!
//! Verifies the single-session lifecycle, mode tracking over the whole history and the
//! close conditions (record length and mode capacity).

use pretty_assertions::assert_eq;
use tpsim_core::common::LineAddr;
use tpsim_core::prefetch::compress::CompressionMode;
use tpsim_core::prefetch::recorder::{Append, Recorder};
use tpsim_core::prefetch::Trigger;

const BASE: u64 = 0x1000;

fn started() -> Recorder {
    let mut rec = Recorder::new();
    rec.start(Trigger {
        addr: LineAddr(BASE),
        way: 2,
    });
    rec
}

// ══════════════════════════════════════════════════════════
// 1. Session lifecycle
// ══════════════════════════════════════════════════════════

#[test]
fn idle_recorder_ignores_appends() {
    let mut rec = Recorder::new();
    assert!(rec.can_start());
    assert_eq!(rec.append(LineAddr(BASE + 1), 4), Append::Idle);
    assert_eq!(rec.cursor(), 0);
}

/// Starting places the trigger in slot 0.
#[test]
fn start_opens_session_with_trigger() {
    let rec = started();
    assert!(rec.is_active());
    assert!(!rec.can_start());
    assert_eq!(rec.cursor(), 1);
    assert_eq!(rec.trigger().map(|t| t.way), Some(2));
}

#[test]
#[should_panic(expected = "recorder started")]
fn second_session_panics() {
    let mut rec = started();
    rec.start(Trigger {
        addr: LineAddr(BASE + 8),
        way: 0,
    });
}

/// The session closes when the cursor reaches `record_length`, trigger included.
#[test]
fn closes_at_record_length() {
    let mut rec = started();
    assert_eq!(rec.append(LineAddr(BASE + 1), 4), Append::Recorded);
    assert_eq!(rec.append(LineAddr(BASE + 2), 4), Append::Recorded);
    assert_eq!(rec.append(LineAddr(BASE + 3), 4), Append::Closed);

    assert!(!rec.is_active());
    assert!(rec.has_finished());
    let record = rec.peek_finished().copied().unwrap();
    assert_eq!(record.len, 4);
    assert_eq!(record.trigger.way, 2);
    assert_eq!(
        record.addresses().collect::<Vec<_>>(),
        (0..4).map(|i| LineAddr(BASE + i)).collect::<Vec<_>>()
    );
}

/// A parked record blocks the next session until write-back takes it.
#[test]
fn parked_record_blocks_new_session() {
    let mut rec = started();
    let _ = rec.append(LineAddr(BASE + 1), 2);
    assert!(rec.has_finished());
    assert!(!rec.can_start());

    assert!(rec.take_finished().is_some());
    assert!(rec.can_start());
    assert!(rec.take_finished().is_none());
}

/// Record lengths below 2 still capture one follower.
#[test]
fn record_length_is_clamped() {
    let mut rec = started();
    assert_eq!(rec.append(LineAddr(BASE + 1), 0), Append::Closed);
    assert_eq!(rec.take_finished().map(|r| r.len), Some(2));
}

#[test]
fn abort_drops_session_and_parked_record() {
    let mut rec = started();
    let _ = rec.append(LineAddr(BASE + 1), 8);
    rec.abort();
    assert!(!rec.is_active());
    assert!(rec.can_start());

    let mut rec = started();
    let _ = rec.append(LineAddr(BASE + 1), 2);
    rec.abort();
    assert!(!rec.has_finished());
}

// ══════════════════════════════════════════════════════════
// 2. Mode tracking
// ══════════════════════════════════════════════════════════

/// An address no mode can represent is skipped without advancing the cursor.
#[test]
fn unrepresentable_address_is_skipped() {
    let mut rec = started();
    assert_eq!(rec.append(LineAddr(BASE | (1 << 40)), 4), Append::Skipped);
    assert_eq!(rec.cursor(), 1);
    assert!(rec.is_active());
}

/// A far address widens the mode for the whole history.
#[test]
fn far_address_widens_mode() {
    let mut rec = started();
    let _ = rec.append(LineAddr(BASE + 1), 16);
    assert_eq!(rec.mode(), CompressionMode::Tiny);

    let _ = rec.append(LineAddr(BASE ^ (1 << 25)), 16);
    assert_eq!(rec.mode(), CompressionMode::Medium);

    // Near addresses after a far one keep the wide mode.
    let _ = rec.append(LineAddr(BASE + 2), 16);
    assert_eq!(rec.mode(), CompressionMode::Medium);
}

/// Widening below the current cursor closes the session at the new capacity.
#[test]
fn widening_past_capacity_closes_and_truncates() {
    let mut rec = started();
    for i in 1..=14 {
        assert_eq!(rec.append(LineAddr(BASE + i), 25), Append::Recorded);
    }
    assert_eq!(rec.cursor(), 15);

    assert_eq!(rec.append(LineAddr(BASE ^ (1 << 35)), 25), Append::Closed);
    let record = rec.take_finished().unwrap();
    assert_eq!(record.mode, CompressionMode::Wide);
    assert_eq!(record.len, CompressionMode::Wide.capacity());
    assert_eq!(
        record.addresses().collect::<Vec<_>>(),
        (0..13).map(|i| LineAddr(BASE + i)).collect::<Vec<_>>()
    );
}

/// A long near-only session fills the tiny mode completely.
#[test]
fn tiny_session_reaches_full_capacity() {
    let mut rec = started();
    let mut last = Append::Idle;
    for i in 1..25 {
        last = rec.append(LineAddr(BASE + i), 25);
    }
    assert_eq!(last, Append::Closed);
    let record = rec.take_finished().unwrap();
    assert_eq!(record.mode, CompressionMode::Tiny);
    assert_eq!(record.len, 25);
}
