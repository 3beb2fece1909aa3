//! Temporal prefetch engine.
//!
//! Owns every unit and advances them by one step per [`tick`](TemporalPrefetcher::tick):
//!
//! 1. Drain metadata responses addressed to this engine into the response buffer.
//! 2. While the reset sweep runs, invalidate one set and do nothing else but let queued
//!    metadata writes drain.
//! 3. Sender: emit at most one throttled prefetch, then pick up the next buffered record.
//! 4. Lookup pipeline: move events S0 → S1 → S2 and act on the one leaving S2.
//! 5. Recorder: open a session from the trigger queue if idle.
//! 6. Write-back: install a closed record in the table and queue its metadata write.
//! 7. Send one metadata request (writes first) and commit the table write port.
//!
//! Telemetry goes to three `tracing` targets: `tpsim::trigger`, `tpsim::train` and
//! `tpsim::send`.

use tracing::{debug, info, trace};

use crate::common::addr::LineAddr;
use crate::config::{Config, PrefetchKnobs, SharedKnobs};
use crate::prefetch::compress::CompressedRecord;
use crate::prefetch::lookup::{Action, DecideInputs, LookupPipeline, ResolveLatch, decide, qualify};
use crate::prefetch::metadata::{MetadataChannel, MetadataPort};
use crate::prefetch::policies::ReplacementPolicy;
use crate::prefetch::queue::BoundedQueue;
use crate::prefetch::recorder::{Append, Recorder};
use crate::prefetch::reset::ResetSequencer;
use crate::prefetch::sender::Sender;
use crate::prefetch::table::{TableWrite, TriggerTable};
use crate::prefetch::types::{
    PfSource, PrefetchPort, PrefetchRequest, PrefetchResponse, TrainEvent, Trigger,
};
use crate::stats::PrefetchStats;

/// The temporal prefetch engine.
#[derive(Debug)]
pub struct TemporalPrefetcher {
    /// Event counters.
    pub stats: PrefetchStats,
    knobs: SharedKnobs,
    owner_id: u32,
    block_offset_bits: u32,
    cache_set_bits: u32,
    table: TriggerTable,
    reset: ResetSequencer,
    intake: BoundedQueue<TrainEvent>,
    accepted_this_tick: bool,
    pipeline: LookupPipeline,
    triggers: BoundedQueue<Trigger>,
    recorder: Recorder,
    meta: MetadataPort,
    sender: Sender,
}

impl TemporalPrefetcher {
    /// Creates an engine from `config`.
    ///
    /// The engine starts in its reset sweep. `knobs` is read at the start of every tick and
    /// may be updated from outside between ticks.
    ///
    /// # Arguments
    ///
    /// * `config` - Engine geometry; expected to have passed [`Config::validate`].
    /// * `knobs` - Live knob handle shared with the control plane.
    pub fn new(config: &Config, knobs: SharedKnobs) -> Self {
        let table = TriggerTable::new(
            config.table.sets,
            config.table.ways,
            config.table.tag_bits,
            config.table.policy,
        );
        let q = &config.queues;
        Self {
            stats: PrefetchStats::default(),
            knobs,
            owner_id: config.owner_id,
            block_offset_bits: config.line.block_offset_bits,
            cache_set_bits: config.line.cache_set_bits,
            reset: ResetSequencer::new(table.sets()),
            table,
            intake: BoundedQueue::new(q.train_depth),
            accepted_this_tick: false,
            pipeline: LookupPipeline::new(),
            triggers: BoundedQueue::new(q.trigger_depth),
            recorder: Recorder::new(),
            meta: MetadataPort::new(
                config.owner_id,
                q.meta_read_depth,
                q.meta_write_depth,
                q.meta_response_depth,
            ),
            sender: Sender::new(),
        }
    }

    /// Creates an engine whose knobs are the config's initial values.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config, SharedKnobs::new(config.knobs))
    }

    /// Replaces the trigger table's replacement policy.
    pub fn with_policy(mut self, policy: Box<dyn ReplacementPolicy>) -> Self {
        self.table = self.table.with_policy(policy);
        self
    }

    /// Handle to the live knobs.
    pub fn knobs(&self) -> SharedKnobs {
        self.knobs.clone()
    }

    /// The trigger table.
    pub const fn table(&self) -> &TriggerTable {
        &self.table
    }

    /// The recorder.
    pub const fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// The sender.
    pub const fn sender(&self) -> &Sender {
        &self.sender
    }

    /// The metadata port.
    pub const fn metadata(&self) -> &MetadataPort {
        &self.meta
    }

    /// The lookup pipeline.
    pub const fn pipeline(&self) -> &LookupPipeline {
        &self.pipeline
    }

    /// Triggers waiting for the recorder.
    pub fn pending_triggers(&self) -> usize {
        self.triggers.len()
    }

    /// Returns true once the reset sweep has completed.
    pub const fn is_reset_done(&self) -> bool {
        self.reset.is_done()
    }

    /// Returns true if a train event offered this tick would be accepted.
    ///
    /// At most one event is accepted between two ticks, whatever the intake depth.
    pub fn train_ready(&self) -> bool {
        self.reset.is_done() && !self.accepted_this_tick && self.intake.ready()
    }

    /// Offers a train event. Returns false if the intake is not ready.
    pub fn train(&mut self, event: TrainEvent) -> bool {
        if !self.train_ready() || self.intake.push(event).is_err() {
            return false;
        }
        self.accepted_this_tick = true;
        true
    }

    /// Accepts a prefetch acknowledgement from the cache slice.
    pub fn on_prefetch_response(&mut self, resp: PrefetchResponse) {
        if resp.accepted {
            self.stats.prefetches_accepted += 1;
        } else {
            self.stats.prefetches_rejected += 1;
        }
    }

    /// Restarts the reset sweep, dropping every in-flight event, trigger and session.
    ///
    /// Queued metadata writes are kept; reads and buffered responses are dropped.
    pub fn reset(&mut self) {
        info!(target: "tpsim::trigger", "reset sweep restarted");
        self.reset.restart();
        self.table.set_ready(false);
        self.intake.clear();
        self.pipeline.flush();
        self.triggers.clear();
        self.recorder.abort();
        self.sender.abort();
        self.meta.flush_reads();
    }

    /// Returns true when no work can make progress without new training events.
    ///
    /// An open recording does not count: it only closes when more events arrive.
    pub fn is_idle(&self) -> bool {
        self.reset.is_done()
            && self.intake.is_empty()
            && self.pipeline.is_empty()
            && !self.recorder.has_finished()
            && !self.sender.is_busy()
            && self.meta.is_quiescent()
    }

    /// Advances the engine by one tick.
    pub fn tick(&mut self, prefetch: &mut dyn PrefetchPort, channel: &mut dyn MetadataChannel) {
        let knobs = self.knobs.snapshot();
        self.stats.cycles += 1;
        self.accepted_this_tick = false;

        self.receive_responses(channel);

        if !self.reset.is_done() {
            self.stats.reset_cycles += 1;
            // Answers to reads issued before a re-arm refer to wiped triggers.
            while self.meta.pop_response().is_some() {}
            if let Some(write) = self.reset.tick() {
                self.table.write(write);
            }
            self.issue_metadata(channel);
            self.table.commit();
            if self.reset.is_done() {
                self.table.set_ready(true);
                info!(
                    target: "tpsim::trigger",
                    sets = self.table.sets(),
                    cycle = self.stats.cycles,
                    "reset sweep complete"
                );
            }
            return;
        }

        if knobs.enable {
            self.send(prefetch, &knobs);
        }
        self.start_replay();

        // S0 reads the set two ticks before S2 acts, so a trigger recurring right behind its
        // own recording misses: its write-back has not committed yet.
        let incoming = self.intake.pop().and_then(|event| self.admit(event, &knobs));
        if let Some(resolved) = self.pipeline.tick(incoming, &mut self.table) {
            self.resolve(&resolved, &knobs);
        }

        self.start_session();
        self.write_back();
        self.issue_metadata(channel);
        self.table.commit();
    }

    fn receive_responses(&mut self, channel: &mut dyn MetadataChannel) {
        while let Some(resp) = channel.recv_response() {
            if self.meta.receive(resp) {
                self.stats.meta_responses += 1;
            } else {
                self.stats.meta_responses_foreign += 1;
            }
        }
    }

    fn issue_metadata(&mut self, channel: &mut dyn MetadataChannel) {
        if let Some(req) = self.meta.issue(channel) {
            trace!(set = req.set, way = req.way, write = req.write, "metadata request sent");
        }
    }

    /// Converts a replayed line address into a request for the cache slice.
    fn prefetch_request(&self, addr: LineAddr) -> PrefetchRequest {
        let set_mask = (1u64 << self.cache_set_bits) - 1;
        PrefetchRequest {
            tag: addr.val() >> self.cache_set_bits,
            set: addr.val() & set_mask,
            addr: addr.to_byte(self.block_offset_bits),
            need_exclusive: false,
            source: self.owner_id,
            pf_source: PfSource::Temporal,
        }
    }

    fn send(&mut self, prefetch: &mut dyn PrefetchPort, knobs: &PrefetchKnobs) {
        let Some(emission) = self.sender.tick(knobs.throttle_cycles, prefetch.ready()) else {
            return;
        };
        let req = self.prefetch_request(emission.addr);
        prefetch.issue(req);
        self.stats.prefetches_issued += 1;
        debug!(
            target: "tpsim::send",
            addr = %emission.addr,
            index = emission.index,
            cycle = self.stats.cycles,
            "prefetch issued"
        );
        if emission.last {
            self.stats.replays_completed += 1;
        }
    }

    fn start_replay(&mut self) {
        if self.sender.is_busy() {
            return;
        }
        let Some(resp) = self.meta.pop_response() else {
            return;
        };
        match resp.record {
            Some(record) => {
                if self.sender.start(record) {
                    self.stats.replays_started += 1;
                    debug!(
                        target: "tpsim::send",
                        trigger = %record.trigger.addr,
                        len = record.len,
                        mode = ?record.mode,
                        "replay started"
                    );
                }
            }
            None => self.stats.meta_responses_empty += 1,
        }
    }

    /// S0 filter. Returns the event with its training line address if it qualifies.
    fn admit(&mut self, event: TrainEvent, knobs: &PrefetchKnobs) -> Option<(TrainEvent, LineAddr)> {
        self.stats.train_accepted += 1;
        let line = if knobs.enable {
            qualify(&event, knobs, self.block_offset_bits)
        } else {
            None
        };
        if line.is_none() {
            self.stats.train_filtered += 1;
        }
        line.map(|addr| (event, addr))
    }

    /// S2 action for the event leaving the pipeline.
    fn resolve(&mut self, resolved: &ResolveLatch, knobs: &PrefetchKnobs) {
        if resolved.hit {
            self.stats.table_hits += 1;
            if self.meta.enqueue_read(resolved.set, resolved.way) {
                self.stats.meta_reads += 1;
            } else {
                self.stats.meta_reads_dropped += 1;
            }
        } else {
            self.stats.table_misses += 1;
        }

        let action = decide(
            resolved,
            knobs,
            DecideInputs {
                queued_triggers: self.triggers.len(),
                trigger_queue_ready: self.triggers.ready(),
                recording: self.recorder.is_active(),
            },
        );
        debug!(
            target: "tpsim::train",
            addr = %resolved.addr,
            set = resolved.set,
            way = resolved.way,
            hit = resolved.hit,
            victim_valid = resolved.victim_valid,
            cache_hit = resolved.event.hit,
            prefetched = resolved.event.prefetched,
            meta_hit = resolved.event.meta_hit,
            action = ?action,
            "train event resolved"
        );

        match action {
            Action::StartTrigger(trigger) => {
                if self.triggers.push(trigger).is_ok() {
                    self.stats.triggers_enqueued += 1;
                    debug!(
                        target: "tpsim::trigger",
                        addr = %trigger.addr,
                        way = trigger.way,
                        "trigger enqueued"
                    );
                }
            }
            Action::Record(addr) => match self.recorder.append(addr, knobs.record_length) {
                Append::Recorded | Append::Closed => self.stats.addresses_recorded += 1,
                Append::Skipped => self.stats.addresses_skipped += 1,
                Append::Idle => self.stats.events_dropped += 1,
            },
            Action::Drop => self.stats.events_dropped += 1,
        }
    }

    fn start_session(&mut self) {
        if !self.recorder.can_start() {
            return;
        }
        if let Some(trigger) = self.triggers.pop() {
            self.recorder.start(trigger);
            self.stats.sessions_started += 1;
            debug!(
                target: "tpsim::trigger",
                addr = %trigger.addr,
                way = trigger.way,
                "recording session opened"
            );
        }
    }

    /// Installs a closed record in the table and queues its metadata write.
    ///
    /// Holds the record while the write queue is full or the table write port is taken.
    fn write_back(&mut self) {
        if !self.recorder.has_finished() || !self.meta.write_ready() || !self.table.write_ready() {
            return;
        }
        let Some(record) = self.recorder.take_finished() else {
            return;
        };
        let (tag, set) = self.table.index(record.trigger.addr);
        // A trigger already resident keeps its way so the set never holds duplicate tags.
        let way = match self.table.find(set, tag) {
            Some(way) => way,
            None => {
                let way = self.table.placement(set, record.trigger.way);
                if self.table.entry(set, way).valid {
                    self.stats.table_evictions += 1;
                }
                way
            }
        };
        let record = CompressedRecord {
            trigger: Trigger {
                addr: record.trigger.addr,
                way,
            },
            ..record
        };

        self.table.write(TableWrite::install(set, way, tag));
        self.meta.enqueue_write(set, way, record);
        self.stats.meta_writes += 1;
        self.stats.count_record(record.mode);
        debug!(
            target: "tpsim::trigger",
            addr = %record.trigger.addr,
            set,
            way,
            len = record.len,
            mode = ?record.mode,
            "record written back"
        );
    }
}
