//! Reference Metadata Store Tests.

use pretty_assertions::assert_eq;
use tpsim_core::common::LineAddr;
use tpsim_core::prefetch::compress::{CompressedRecord, CompressionMode};
use tpsim_core::prefetch::{MetaRequest, MetadataChannel, Trigger};
use tpsim_core::sim::LatencyMetadataStore;

fn record(first: u64) -> CompressedRecord {
    let history = [LineAddr(first), LineAddr(first + 1)];
    CompressedRecord::compress(
        Trigger {
            addr: history[0],
            way: 0,
        },
        &history,
        CompressionMode::Tiny,
    )
}

fn write(set: usize, way: usize, rec: CompressedRecord) -> MetaRequest {
    MetaRequest {
        set,
        way,
        write: true,
        record: Some(rec),
        owner_id: 0,
    }
}

fn read(set: usize, way: usize, owner_id: u32) -> MetaRequest {
    MetaRequest {
        set,
        way,
        write: false,
        record: None,
        owner_id,
    }
}

/// A read answers after exactly `latency` ticks with the owner id it was sent with.
#[test]
fn read_answers_after_latency() {
    let mut store = LatencyMetadataStore::new(3, 4);
    store.send_request(write(1, 2, record(0x1000)));
    store.send_request(read(1, 2, 9));

    for _ in 0..3 {
        assert!(store.recv_response().is_none());
        store.tick();
    }
    let resp = store.recv_response().unwrap();
    assert_eq!(resp.owner_id, 9);
    assert_eq!(resp.record, Some(record(0x1000)));
    assert!(store.is_idle());
}

/// A slot that was never written answers with no record.
#[test]
fn unwritten_slot_reads_empty() {
    let mut store = LatencyMetadataStore::new(0, 4);
    store.send_request(read(0, 0, 0));
    assert_eq!(store.recv_response().map(|r| r.record), Some(None));
}

/// A read sees the slot as it was when the read was accepted.
#[test]
fn read_snapshots_at_acceptance() {
    let mut store = LatencyMetadataStore::new(2, 4);
    store.send_request(write(0, 0, record(0x1000)));
    store.send_request(read(0, 0, 0));
    store.send_request(write(0, 0, record(0x2000)));

    store.tick();
    store.tick();
    assert_eq!(store.recv_response().and_then(|r| r.record), Some(record(0x1000)));
    assert_eq!(store.get(0, 0), Some(&record(0x2000)));
    assert_eq!(store.len(), 1);
}

/// The store stops accepting once `capacity` reads are outstanding.
#[test]
fn capacity_limits_outstanding_reads() {
    let mut store = LatencyMetadataStore::new(5, 2);
    assert!(store.request_ready());
    store.send_request(read(0, 0, 0));
    store.send_request(read(0, 1, 0));
    assert!(!store.request_ready());
    assert_eq!(store.in_flight(), 2);
    assert_eq!(store.reads, 2);
}
