//! Reference metadata store.
//!
//! An in-memory key-value store addressed by trigger table `(set, way)`. It models:
//! 1. **Writes:** Applied at acceptance; a later read of the same slot sees them.
//! 2. **Reads:** Snapshot the slot at acceptance and answer `latency` ticks later.
//! 3. **Backpressure:** At most `capacity` reads in flight; `request_ready` drops while full.

use std::collections::{HashMap, VecDeque};

use crate::config::StoreConfig;
use crate::prefetch::compress::CompressedRecord;
use crate::prefetch::metadata::{MetaRequest, MetaResponse, MetadataChannel};

/// Fixed-latency metadata store.
#[derive(Debug)]
pub struct LatencyMetadataStore {
    records: HashMap<(usize, usize), CompressedRecord>,
    in_flight: VecDeque<(u64, MetaResponse)>,
    latency: u64,
    capacity: usize,
    now: u64,
    /// Read requests accepted.
    pub reads: u64,
    /// Write requests accepted.
    pub writes: u64,
}

impl LatencyMetadataStore {
    /// Creates an empty store.
    ///
    /// # Arguments
    ///
    /// * `latency` - Ticks from acceptance until a read's response can be received.
    /// * `capacity` - Requests held in flight before `request_ready` drops.
    pub fn new(latency: u64, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: HashMap::new(),
            in_flight: VecDeque::with_capacity(capacity),
            latency,
            capacity,
            now: 0,
            reads: 0,
            writes: 0,
        }
    }

    /// Creates a store from the `store` config section.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.latency, config.capacity)
    }

    /// Advances the store clock by one tick.
    pub fn tick(&mut self) {
        self.now += 1;
    }

    /// Current store tick.
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Returns the record stored at `(set, way)`.
    pub fn get(&self, set: usize, way: usize) -> Option<&CompressedRecord> {
        self.records.get(&(set, way))
    }

    /// Number of slots holding a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no slot has been written.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Reads accepted and not yet answered.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns true when no response is pending.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }
}

impl MetadataChannel for LatencyMetadataStore {
    fn request_ready(&self) -> bool {
        self.in_flight.len() < self.capacity
    }

    fn send_request(&mut self, req: MetaRequest) {
        if req.write {
            self.writes += 1;
            if let Some(record) = req.record {
                let _ = self.records.insert((req.set, req.way), record);
            }
            return;
        }
        self.reads += 1;
        let resp = MetaResponse {
            record: self.records.get(&(req.set, req.way)).copied(),
            owner_id: req.owner_id,
        };
        self.in_flight.push_back((self.now + self.latency, resp));
    }

    fn recv_response(&mut self) -> Option<MetaResponse> {
        match self.in_flight.front() {
            Some(&(ready_at, _)) if ready_at <= self.now => {
                self.in_flight.pop_front().map(|(_, resp)| resp)
            }
            _ => None,
        }
    }
}
