//! Prefetch sink used by the simulator.

use serde::Serialize;

use crate::prefetch::types::{PrefetchPort, PrefetchRequest};

/// A prefetch accepted by the sink, stamped with the tick it arrived on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct IssuedPrefetch {
    /// Simulator tick of the emission.
    pub cycle: u64,
    /// The request.
    pub request: PrefetchRequest,
}

/// Records every prefetch it receives.
///
/// Readiness can be forced low to model a busy request arbiter.
#[derive(Debug)]
pub struct PrefetchLog {
    issued: Vec<IssuedPrefetch>,
    acked: usize,
    cycle: u64,
    ready: bool,
}

impl Default for PrefetchLog {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefetchLog {
    /// Creates an empty, ready sink.
    pub const fn new() -> Self {
        Self {
            issued: Vec::new(),
            acked: 0,
            cycle: 0,
            ready: true,
        }
    }

    /// Sets the tick stamped on subsequent requests.
    pub fn set_cycle(&mut self, cycle: u64) {
        self.cycle = cycle;
    }

    /// Forces readiness.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Every request received so far, oldest first.
    pub fn issued(&self) -> &[IssuedPrefetch] {
        &self.issued
    }

    /// Returns the number of requests received since the last call.
    pub fn take_unacked(&mut self) -> usize {
        let fresh = self.issued.len() - self.acked;
        self.acked = self.issued.len();
        fresh
    }

    /// Consumes the sink, returning every request received.
    pub fn into_issued(self) -> Vec<IssuedPrefetch> {
        self.issued
    }
}

impl PrefetchPort for PrefetchLog {
    fn ready(&self) -> bool {
        self.ready
    }

    fn issue(&mut self, request: PrefetchRequest) {
        self.issued.push(IssuedPrefetch {
            cycle: self.cycle,
            request,
        });
    }
}
