//! Trigger Table Tests.
//!
//! Verifies indexing, the single end-of-tick write port and reset gating.

use pretty_assertions::assert_eq;
use tpsim_core::common::LineAddr;
use tpsim_core::config::ReplacementPolicy;
use tpsim_core::prefetch::table::{TableWrite, TriggerEntry, TriggerTable};

fn ready_table(sets: usize, ways: usize) -> TriggerTable {
    let mut table = TriggerTable::new(sets, ways, 20, ReplacementPolicy::Lru);
    table.set_ready(true);
    table
}

// ══════════════════════════════════════════════════════════
// 1. Geometry and indexing
// ══════════════════════════════════════════════════════════

#[test]
fn geometry_is_normalized() {
    let table = TriggerTable::new(12, 64, 20, ReplacementPolicy::Random);
    assert_eq!(table.sets(), 16);
    assert_eq!(table.ways(), 32);
}

#[test]
fn index_stays_in_range() {
    let table = ready_table(64, 4);
    for line in [0u64, 1, 0x3f, 0x40, 0xdead_beef, u64::MAX] {
        let (tag, set) = table.index(LineAddr(line));
        assert!(set < 64);
        assert!(tag < (1 << 20));
    }
}

/// Distinct lines never share both tag and set while the tag is wide enough.
#[test]
fn index_is_injective_for_narrow_addresses() {
    let table = ready_table(16, 4);
    let mut seen = std::collections::HashSet::new();
    for line in 0..4096u64 {
        assert!(seen.insert(table.index(LineAddr(line))), "collision at {line:#x}");
    }
}

// ══════════════════════════════════════════════════════════
// 2. Write port
// ══════════════════════════════════════════════════════════

/// A write is invisible to lookups until commit.
#[test]
fn write_commits_at_end_of_tick() {
    let mut table = ready_table(16, 4);
    table.write(TableWrite::install(3, 1, 0xabc));
    assert!(!table.write_ready());
    assert_eq!(table.lookup(3).find(0xabc), None);

    table.commit();
    assert!(table.write_ready());
    assert_eq!(table.lookup(3).find(0xabc), Some(1));
    assert_eq!(table.find(3, 0xabc), Some(1));
    assert_eq!(table.occupancy(3), 1);
}

#[test]
#[should_panic(expected = "write port driven twice")]
fn second_write_in_one_tick_panics() {
    let mut table = ready_table(16, 4);
    table.write(TableWrite::install(0, 0, 1));
    table.write(TableWrite::install(0, 1, 2));
}

#[test]
fn invalidate_set_clears_every_way() {
    let mut table = ready_table(16, 4);
    for way in 0..4 {
        table.write(TableWrite::install(5, way, way as u64 + 10));
        table.commit();
    }
    assert!(table.lookup(5).is_full());

    table.write(TableWrite::invalidate_set(5));
    table.commit();
    assert_eq!(table.occupancy(5), 0);
    assert!(table.lookup(5).entries().iter().all(|e| !e.valid));
}

/// Installing into a way informs the replacement policy.
#[test]
fn install_updates_replacement_state() {
    let mut table = ready_table(16, 4);
    assert_eq!(table.victim(0), 3);
    table.write(TableWrite::install(0, 3, 7));
    table.commit();
    assert_eq!(table.victim(0), 2);
}

#[test]
fn touch_protects_way_from_lru_eviction() {
    let mut table = ready_table(16, 2);
    table.touch(0, 1);
    assert_eq!(table.victim(0), 0);
    table.touch(0, 0);
    assert_eq!(table.victim(0), 1);
}

/// A reserved way that is still free is kept.
#[test]
fn placement_keeps_free_reserved_way() {
    let mut table = ready_table(16, 4);
    assert_eq!(table.placement(0, 2), 2);
}

/// A reserved way claimed since the lookup falls back to the first free way.
#[test]
fn placement_skips_claimed_reserved_way() {
    let mut table = ready_table(16, 4);
    table.write(TableWrite::install(0, 3, 0x11));
    table.commit();
    assert_eq!(table.placement(0, 3), 0);
}

/// A full set asks the policy again.
#[test]
fn placement_in_full_set_uses_current_victim() {
    let mut table = ready_table(16, 4);
    for way in [3, 2, 1, 0] {
        table.write(TableWrite::install(0, way, way as u64 + 1));
        table.commit();
    }
    assert_eq!(table.occupancy(0), 4);
    assert_eq!(table.placement(0, 1), 3);
}

// ══════════════════════════════════════════════════════════
// 3. Reset gating
// ══════════════════════════════════════════════════════════

/// Until marked ready, every lookup reads invalid even if entries are set.
#[test]
fn lookup_misses_until_ready() {
    let mut table = TriggerTable::new(16, 4, 20, ReplacementPolicy::Lru);
    assert!(!table.is_ready());
    table.write(TableWrite::install(2, 0, 0x55));
    table.commit();

    assert_eq!(table.entry(2, 0), TriggerEntry { valid: true, tag: 0x55 });
    assert_eq!(table.lookup(2).find(0x55), None);

    table.set_ready(true);
    assert_eq!(table.lookup(2).find(0x55), Some(0));
}
