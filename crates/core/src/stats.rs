//! Prefetch engine statistics.
//!
//! Counters are bumped by the engine as events flow through it. They are observational
//! only and never feed back into engine decisions.

use serde::Serialize;

use crate::prefetch::compress::CompressionMode;

/// Event counters for one engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PrefetchStats {
    /// Ticks advanced.
    pub cycles: u64,
    /// Ticks spent in the reset sweep.
    pub reset_cycles: u64,

    /// Train events accepted at the intake.
    pub train_accepted: u64,
    /// Train events discarded by the qualification filter or while disabled.
    pub train_filtered: u64,
    /// Lookups that hit the trigger table.
    pub table_hits: u64,
    /// Lookups that missed the trigger table.
    pub table_misses: u64,
    /// Write-backs that replaced a valid trigger.
    pub table_evictions: u64,

    /// Events enqueued as new triggers.
    pub triggers_enqueued: u64,
    /// Events that reached S2 and were neither triggers nor recorded.
    pub events_dropped: u64,
    /// Recording sessions opened.
    pub sessions_started: u64,
    /// Addresses appended to a recording.
    pub addresses_recorded: u64,
    /// Addresses too far from their trigger to record.
    pub addresses_skipped: u64,
    /// Records written back, indexed by compression mode.
    pub records_by_mode: [u64; 4],

    /// Metadata read requests queued.
    pub meta_reads: u64,
    /// Metadata reads not queued for lack of queue space or response credit.
    pub meta_reads_dropped: u64,
    /// Metadata write requests queued.
    pub meta_writes: u64,
    /// Responses accepted for this engine.
    pub meta_responses: u64,
    /// Responses carrying another engine's owner id.
    pub meta_responses_foreign: u64,
    /// Responses for slots that held no record.
    pub meta_responses_empty: u64,

    /// Replays started.
    pub replays_started: u64,
    /// Replays that emitted their last address.
    pub replays_completed: u64,
    /// Prefetch requests issued.
    pub prefetches_issued: u64,
    /// Prefetch acknowledgements reporting acceptance.
    pub prefetches_accepted: u64,
    /// Prefetch acknowledgements reporting rejection.
    pub prefetches_rejected: u64,
}

impl PrefetchStats {
    /// Total records written back.
    pub fn records_written(&self) -> u64 {
        self.records_by_mode.iter().sum()
    }

    /// Bumps the record counter for `mode`.
    pub fn count_record(&mut self, mode: CompressionMode) {
        self.records_by_mode[mode.index()] += 1;
    }

    /// Prints all statistics to stdout.
    pub fn print(&self) {
        let lookups = self.table_hits + self.table_misses;
        let hit_rate = if lookups > 0 {
            100.0 * (self.table_hits as f64 / lookups as f64)
        } else {
            0.0
        };
        let acks = self.prefetches_accepted + self.prefetches_rejected;
        let accept_rate = if acks > 0 {
            100.0 * (self.prefetches_accepted as f64 / acks as f64)
        } else {
            0.0
        };

        println!("\n==========================================================");
        println!("TEMPORAL PREFETCH ENGINE STATISTICS");
        println!("==========================================================");
        println!("sim_cycles               {}", self.cycles);
        println!("reset_cycles             {}", self.reset_cycles);
        println!("----------------------------------------------------------");
        println!("TRAINING");
        println!("  train.accepted         {}", self.train_accepted);
        println!("  train.filtered         {}", self.train_filtered);
        println!("  table.lookups          {lookups}");
        println!("  table.hit_rate         {hit_rate:.2}%");
        println!("  table.evictions        {}", self.table_evictions);
        println!("----------------------------------------------------------");
        println!("RECORDING");
        println!("  triggers.enqueued      {}", self.triggers_enqueued);
        println!("  events.dropped         {}", self.events_dropped);
        println!("  sessions.started       {}", self.sessions_started);
        println!("  addresses.recorded     {}", self.addresses_recorded);
        println!("  addresses.skipped      {}", self.addresses_skipped);
        for mode in CompressionMode::ALL {
            println!(
                "  records.{:<14} {}",
                format!("{mode:?}").to_lowercase(),
                self.records_by_mode[mode.index()]
            );
        }
        println!("----------------------------------------------------------");
        println!("METADATA");
        println!("  meta.reads             {}", self.meta_reads);
        println!("  meta.reads_dropped     {}", self.meta_reads_dropped);
        println!("  meta.writes            {}", self.meta_writes);
        println!("  meta.responses         {}", self.meta_responses);
        println!("  meta.responses_empty   {}", self.meta_responses_empty);
        println!("  meta.responses_foreign {}", self.meta_responses_foreign);
        println!("----------------------------------------------------------");
        println!("REPLAY");
        println!("  replays.started        {}", self.replays_started);
        println!("  replays.completed      {}", self.replays_completed);
        println!("  prefetch.issued        {}", self.prefetches_issued);
        println!("  prefetch.accept_rate   {accept_rate:.2}%");
        println!("==========================================================");
    }
}
