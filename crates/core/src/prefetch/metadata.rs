//! Metadata Store Interface.
//!
//! Compressed records live in an external key-value store addressed by trigger table
//! `(set, way)`. The engine talks to it by message passing:
//! 1. **Requests:** Separate read and write queues merge into one outbound stream; a
//!    pending write always goes before a pending read.
//! 2. **Responses:** Read responses arrive after an unbounded delay, are matched to this
//!    engine by owner id, and wait in an inbound buffer for the sender.
//! 3. **Credits:** A read is only queued while the inbound buffer has room for its response,
//!    so the buffer cannot overflow.

use serde::{Deserialize, Serialize};

use crate::prefetch::compress::CompressedRecord;
use crate::prefetch::queue::BoundedQueue;

/// One request to the metadata store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRequest {
    /// Trigger table set.
    pub set: usize,
    /// Trigger table way.
    pub way: usize,
    /// Write (`true`) or read (`false`).
    pub write: bool,
    /// Record to store; present on writes only.
    pub record: Option<CompressedRecord>,
    /// Issuing engine.
    pub owner_id: u32,
}

/// One response from the metadata store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaResponse {
    /// Stored record, or `None` if the slot was never written.
    pub record: Option<CompressedRecord>,
    /// Engine the response belongs to.
    pub owner_id: u32,
}

/// The external metadata store, seen as a pair of channels.
pub trait MetadataChannel {
    /// The store accepts a request this tick.
    fn request_ready(&self) -> bool;

    /// Sends one request. Only called after `request_ready()` returned true in the same tick.
    fn send_request(&mut self, req: MetaRequest);

    /// Takes the next available response, if any.
    fn recv_response(&mut self) -> Option<MetaResponse>;
}

/// Request arbitration and response buffering for one engine.
#[derive(Debug)]
pub struct MetadataPort {
    owner_id: u32,
    reads: BoundedQueue<MetaRequest>,
    writes: BoundedQueue<MetaRequest>,
    responses: BoundedQueue<MetaResponse>,
    reads_in_flight: usize,
}

impl MetadataPort {
    /// Creates a port with the given queue depths.
    ///
    /// The response buffer is never smaller than the read queue.
    ///
    /// # Arguments
    ///
    /// * `owner_id` - Identifier stamped on requests and matched on responses.
    /// * `read_depth` - Outbound read request queue depth.
    /// * `write_depth` - Outbound write request queue depth.
    /// * `response_depth` - Inbound response buffer depth; reads are credited against it.
    pub fn new(owner_id: u32, read_depth: usize, write_depth: usize, response_depth: usize) -> Self {
        Self {
            owner_id,
            reads: BoundedQueue::new(read_depth),
            writes: BoundedQueue::new(write_depth),
            responses: BoundedQueue::new(response_depth.max(read_depth)),
            reads_in_flight: 0,
        }
    }

    /// Identifier stamped on requests.
    pub const fn owner_id(&self) -> u32 {
        self.owner_id
    }

    /// Returns true if a read can be queued this tick.
    pub fn read_ready(&self) -> bool {
        let committed = self.reads.len() + self.reads_in_flight + self.responses.len();
        self.reads.ready() && committed < self.responses.capacity()
    }

    /// Queues a read for `(set, way)`. Returns false if not ready.
    pub fn enqueue_read(&mut self, set: usize, way: usize) -> bool {
        if !self.read_ready() {
            return false;
        }
        self.reads
            .push(MetaRequest {
                set,
                way,
                write: false,
                record: None,
                owner_id: self.owner_id,
            })
            .is_ok()
    }

    /// Returns true if a write can be queued this tick.
    pub fn write_ready(&self) -> bool {
        self.writes.ready()
    }

    /// Queues a write of `record` to `(set, way)`.
    ///
    /// # Panics
    ///
    /// Panics if the write queue is full; callers check [`write_ready`](Self::write_ready).
    pub fn enqueue_write(&mut self, set: usize, way: usize, record: CompressedRecord) {
        let req = MetaRequest {
            set,
            way,
            write: true,
            record: Some(record),
            owner_id: self.owner_id,
        };
        assert!(
            self.writes.push(req).is_ok(),
            "metadata write queue rejected a write-back"
        );
    }

    /// Picks the next request to send: writes before reads.
    pub fn arbitrate(&mut self) -> Option<MetaRequest> {
        if let Some(req) = self.writes.pop() {
            return Some(req);
        }
        let req = self.reads.pop()?;
        self.reads_in_flight += 1;
        Some(req)
    }

    /// Sends at most one request if the store is ready.
    pub fn issue(&mut self, channel: &mut dyn MetadataChannel) -> Option<MetaRequest> {
        if !channel.request_ready() {
            return None;
        }
        let req = self.arbitrate()?;
        channel.send_request(req);
        Some(req)
    }

    /// Accepts a response from the store. Returns false if it belongs to another engine.
    ///
    /// # Panics
    ///
    /// Panics if the response was not preceded by a read from this engine or the inbound
    /// buffer is full; both mean the credit accounting is broken.
    pub fn receive(&mut self, resp: MetaResponse) -> bool {
        if resp.owner_id != self.owner_id {
            return false;
        }
        assert!(
            self.reads_in_flight > 0,
            "metadata response without an outstanding read"
        );
        self.reads_in_flight -= 1;
        assert!(
            self.responses.push(resp).is_ok(),
            "metadata response buffer overflow"
        );
        true
    }

    /// Takes the oldest buffered response.
    pub fn pop_response(&mut self) -> Option<MetaResponse> {
        self.responses.pop()
    }

    /// Reads sent and not yet answered.
    pub const fn reads_in_flight(&self) -> usize {
        self.reads_in_flight
    }

    /// Queued read requests.
    pub fn pending_reads(&self) -> usize {
        self.reads.len()
    }

    /// Queued write requests.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Buffered responses.
    pub fn buffered_responses(&self) -> usize {
        self.responses.len()
    }

    /// Returns true when nothing is queued, in flight or buffered.
    pub fn is_quiescent(&self) -> bool {
        self.reads.is_empty()
            && self.writes.is_empty()
            && self.responses.is_empty()
            && self.reads_in_flight == 0
    }

    /// Drops queued reads and buffered responses. Writes and in-flight accounting survive.
    pub fn flush_reads(&mut self) {
        self.reads.clear();
        self.responses.clear();
    }
}
