//! Simulator: owns the engine, the metadata store and the prefetch sink side by side.
//!
//! Each tick the simulator offers at most one trace event, ticks the engine against the
//! store and sink, acknowledges new prefetches, then ticks the store clock. Once the trace
//! is exhausted it keeps ticking until the engine and store drain.

use serde::Serialize;
use tracing::info;

use crate::config::{Config, SharedKnobs};
use crate::prefetch::engine::TemporalPrefetcher;
use crate::prefetch::types::{PrefetchResponse, TrainEvent};
use crate::sim::port::{IssuedPrefetch, PrefetchLog};
use crate::sim::store::LatencyMetadataStore;
use crate::stats::PrefetchStats;

/// Outcome of a trace run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SimReport {
    /// Ticks simulated.
    pub cycles: u64,
    /// Trace events the engine accepted.
    pub events_fed: usize,
    /// The run stopped at the cycle limit before draining.
    pub truncated: bool,
    /// Engine counters.
    pub stats: PrefetchStats,
    /// Slots holding a record at the end of the run.
    pub records_stored: usize,
    /// Every prefetch emitted, in order.
    pub prefetches: Vec<IssuedPrefetch>,
}

/// Top-level simulator.
#[derive(Debug)]
pub struct Simulator {
    /// The engine under test.
    pub engine: TemporalPrefetcher,
    /// Reference metadata store.
    pub store: LatencyMetadataStore,
    /// Prefetch sink.
    pub log: PrefetchLog,
    cycle: u64,
}

impl Simulator {
    /// Creates a simulator from `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            engine: TemporalPrefetcher::new(config, SharedKnobs::new(config.knobs)),
            store: LatencyMetadataStore::from_config(&config.store),
            log: PrefetchLog::new(),
            cycle: 0,
        }
    }

    /// Ticks simulated so far.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Advances everything by one tick.
    pub fn tick(&mut self) {
        self.log.set_cycle(self.cycle);
        self.engine.tick(&mut self.log, &mut self.store);
        for _ in 0..self.log.take_unacked() {
            self.engine
                .on_prefetch_response(PrefetchResponse { accepted: true });
        }
        self.store.tick();
        self.cycle += 1;
    }

    /// Returns true when neither the engine nor the store has work left.
    pub fn is_drained(&self) -> bool {
        self.engine.is_idle() && self.store.is_idle()
    }

    /// Ticks until the engine's reset sweep completes or `max_cycles` elapse.
    pub fn run_reset(&mut self, max_cycles: u64) {
        while !self.engine.is_reset_done() && self.cycle < max_cycles {
            self.tick();
        }
    }

    /// Feeds `events` in order and runs until drained or `max_cycles` ticks have passed.
    pub fn run(mut self, events: &[TrainEvent], max_cycles: u64) -> SimReport {
        let mut fed = 0;
        while self.cycle < max_cycles {
            if fed < events.len() && self.engine.train(events[fed]) {
                fed += 1;
            }
            self.tick();
            if fed == events.len() && self.is_drained() {
                break;
            }
        }
        let truncated = fed < events.len() || !self.is_drained();
        info!(
            cycles = self.cycle,
            events = fed,
            prefetches = self.log.issued().len(),
            truncated,
            "simulation finished"
        );
        SimReport {
            cycles: self.cycle,
            events_fed: fed,
            truncated,
            stats: self.engine.stats.clone(),
            records_stored: self.store.len(),
            prefetches: self.log.into_issued(),
        }
    }
}
