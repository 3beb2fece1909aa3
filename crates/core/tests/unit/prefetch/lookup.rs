//! Lookup Pipeline Tests.
//!
//! Verifies the S0 qualification filter, the S1 hit/victim resolution and the S2
//! trigger/record/drop decision.

use pretty_assertions::assert_eq;
use rstest::rstest;
use tpsim_core::common::LineAddr;
use tpsim_core::config::{PrefetchKnobs, ReplacementPolicy};
use tpsim_core::prefetch::lookup::{Action, DecideInputs, LookupPipeline, ResolveLatch, decide, qualify};
use tpsim_core::prefetch::table::{TableWrite, TriggerTable};
use tpsim_core::prefetch::{PfSource, TrainEvent, TrainSource, Trigger};

fn resolved(hit: bool) -> ResolveLatch {
    ResolveLatch {
        event: TrainEvent::demand(0x4_0000),
        addr: LineAddr(0x1000),
        tag: 0x100,
        set: 0,
        hit,
        way: 3,
        victim_valid: false,
    }
}

fn inputs(queued: usize, ready: bool, recording: bool) -> DecideInputs {
    DecideInputs {
        queued_triggers: queued,
        trigger_queue_ready: ready,
        recording,
    }
}

// ══════════════════════════════════════════════════════════
// 1. S0 qualification
// ══════════════════════════════════════════════════════════

#[test]
fn demand_event_qualifies_as_line_address() {
    let knobs = PrefetchKnobs::default();
    assert_eq!(
        qualify(&TrainEvent::demand(0x4_0023), &knobs, 6),
        Some(LineAddr(0x1000))
    );
}

/// Line 0 is never a valid training address.
#[test]
fn line_zero_is_filtered() {
    let knobs = PrefetchKnobs::default();
    assert_eq!(qualify(&TrainEvent::demand(0x3f), &knobs, 6), None);
}

#[rstest]
#[case(false, None)]
#[case(true, Some(LineAddr(0x1000)))]
fn prefetch_sourced_events_follow_knob(#[case] train_on_prefetch: bool, #[case] expected: Option<LineAddr>) {
    let knobs = PrefetchKnobs {
        train_on_prefetch,
        ..PrefetchKnobs::default()
    };
    let event = TrainEvent {
        source: TrainSource::Prefetch(PfSource::Stride),
        ..TrainEvent::demand(0x4_0000)
    };
    assert_eq!(qualify(&event, &knobs, 6), expected);
}

/// With `train_on_vaddr` the virtual address is used, and events without one are dropped.
#[test]
fn vaddr_training() {
    let knobs = PrefetchKnobs {
        train_on_vaddr: true,
        ..PrefetchKnobs::default()
    };
    let with_vaddr = TrainEvent {
        vaddr: Some(0x8_0000),
        ..TrainEvent::demand(0x4_0000)
    };
    assert_eq!(qualify(&with_vaddr, &knobs, 6), Some(LineAddr(0x2000)));
    assert_eq!(qualify(&TrainEvent::demand(0x4_0000), &knobs, 6), None);
}

// ══════════════════════════════════════════════════════════
// 2. S2 decision
// ══════════════════════════════════════════════════════════

/// A hit becomes a trigger when hits count as triggers.
#[test]
fn hit_starts_trigger() {
    let knobs = PrefetchKnobs::default();
    assert_eq!(
        decide(&resolved(true), &knobs, inputs(2, true, true)),
        Action::StartTrigger(Trigger {
            addr: LineAddr(0x1000),
            way: 3
        })
    );
}

#[test]
fn hit_without_hit_as_trigger_is_recorded() {
    let knobs = PrefetchKnobs {
        hit_as_trigger: false,
        ..PrefetchKnobs::default()
    };
    assert_eq!(
        decide(&resolved(true), &knobs, inputs(1, true, true)),
        Action::Record(LineAddr(0x1000))
    );
}

/// A miss starts a trigger only while fewer triggers than the threshold are outstanding.
#[rstest]
#[case(0, false, true)]
#[case(0, true, false)]
#[case(1, false, false)]
fn miss_respects_low_water_threshold(
    #[case] queued: usize,
    #[case] recording: bool,
    #[case] triggers: bool,
) {
    let knobs = PrefetchKnobs::default();
    let action = decide(&resolved(false), &knobs, inputs(queued, true, recording));
    assert_eq!(matches!(action, Action::StartTrigger(_)), triggers);
}

#[test]
fn full_trigger_queue_falls_back_to_recording() {
    let knobs = PrefetchKnobs::default();
    assert_eq!(
        decide(&resolved(true), &knobs, inputs(4, false, true)),
        Action::Record(LineAddr(0x1000))
    );
    assert_eq!(
        decide(&resolved(true), &knobs, inputs(4, false, false)),
        Action::Drop
    );
}

#[test]
fn idle_recorder_drops_non_triggers() {
    let knobs = PrefetchKnobs::default();
    assert_eq!(
        decide(&resolved(false), &knobs, inputs(1, true, false)),
        Action::Drop
    );
}

// ══════════════════════════════════════════════════════════
// 3. Pipeline timing
// ══════════════════════════════════════════════════════════

fn ready_table() -> TriggerTable {
    let mut table = TriggerTable::new(16, 4, 20, ReplacementPolicy::Lru);
    table.set_ready(true);
    table
}

/// An event issued on tick 0 is decided on tick 2, and order is preserved.
#[test]
fn events_leave_s2_two_ticks_later_in_order() {
    let mut table = ready_table();
    let mut pipe = LookupPipeline::new();
    let a = (TrainEvent::demand(0x4_0000), LineAddr(0x1000));
    let b = (TrainEvent::demand(0x4_0040), LineAddr(0x1001));

    assert!(pipe.tick(Some(a), &mut table).is_none());
    assert!(pipe.tick(Some(b), &mut table).is_none());
    assert_eq!(pipe.occupancy(), 2);

    assert_eq!(pipe.tick(None, &mut table).map(|r| r.addr), Some(a.1));
    assert_eq!(pipe.tick(None, &mut table).map(|r| r.addr), Some(b.1));
    assert!(pipe.is_empty());
}

#[test]
fn resolve_reports_hit_way() {
    let mut table = ready_table();
    let (tag, set) = table.index(LineAddr(0x1000));
    table.write(TableWrite::install(set, 1, tag));
    table.commit();

    let mut pipe = LookupPipeline::new();
    let _ = pipe.tick(Some((TrainEvent::demand(0x4_0000), LineAddr(0x1000))), &mut table);
    let _ = pipe.tick(None, &mut table);
    let out = pipe.tick(None, &mut table).unwrap();
    assert!(out.hit);
    assert_eq!(out.way, 1);
    assert_eq!((out.tag, out.set), (tag, set));
}

/// On a miss in a full set the victim way is reported as holding a valid trigger.
#[test]
fn resolve_reports_valid_victim_on_full_set() {
    let mut table = ready_table();
    let (_, set) = table.index(LineAddr(0x1000));
    for way in 0..4 {
        table.write(TableWrite::install(set, way, 0xf000 + way as u64));
        table.commit();
    }

    let mut pipe = LookupPipeline::new();
    let _ = pipe.tick(Some((TrainEvent::demand(0x4_0000), LineAddr(0x1000))), &mut table);
    let _ = pipe.tick(None, &mut table);
    let out = pipe.tick(None, &mut table).unwrap();
    assert!(!out.hit);
    assert!(out.victim_valid);
    assert_eq!(out.way, 0, "LRU victim is the oldest install");
}

/// S0 reads the set before a same-tick write commits.
#[test]
fn lookup_sees_pre_write_contents() {
    let mut table = ready_table();
    let (tag, set) = table.index(LineAddr(0x1000));

    let mut pipe = LookupPipeline::new();
    table.write(TableWrite::install(set, 0, tag));
    let _ = pipe.tick(Some((TrainEvent::demand(0x4_0000), LineAddr(0x1000))), &mut table);
    table.commit();
    let _ = pipe.tick(None, &mut table);
    let out = pipe.tick(None, &mut table).unwrap();
    assert!(!out.hit);
}

#[test]
fn flush_drops_in_flight_events() {
    let mut table = ready_table();
    let mut pipe = LookupPipeline::new();
    let _ = pipe.tick(Some((TrainEvent::demand(0x4_0000), LineAddr(0x1000))), &mut table);
    pipe.flush();
    assert!(pipe.is_empty());
    assert!(pipe.tick(None, &mut table).is_none());
}
