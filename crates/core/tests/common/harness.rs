use tpsim_core::config::{Config, ReplacementPolicy, SharedKnobs};
use tpsim_core::prefetch::{PrefetchPort, TemporalPrefetcher, TrainEvent};
use tpsim_core::sim::{LatencyMetadataStore, PrefetchLog};
use tracing_subscriber::EnvFilter;

/// Block offset used by every test config.
pub const BLOCK_OFFSET_BITS: u32 = 6;

/// Byte address of line `line`.
pub const fn line(line: u64) -> u64 {
    line << BLOCK_OFFSET_BITS
}

/// Installs a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// A small deterministic configuration: 16 sets x 4 ways, LRU, 4-entry records,
/// 2-tick store latency.
pub fn small_config() -> Config {
    let mut config = Config::default();
    config.table.sets = 16;
    config.table.ways = 4;
    config.table.policy = ReplacementPolicy::Lru;
    config.knobs.record_length = 4;
    config.store.latency = 2;
    config
}

pub struct TestContext {
    pub engine: TemporalPrefetcher,
    pub store: LatencyMetadataStore,
    pub log: PrefetchLog,
    pub knobs: SharedKnobs,
    pub cycle: u64,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Builds a context from `small_config()` and runs the reset sweep.
    pub fn new() -> Self {
        Self::with_config(&small_config())
    }

    /// Builds a context from `config` and runs the reset sweep.
    pub fn with_config(config: &Config) -> Self {
        let mut ctx = Self::cold(config);
        while !ctx.engine.is_reset_done() {
            ctx.tick();
        }
        ctx
    }

    /// Builds a context without running the reset sweep.
    pub fn cold(config: &Config) -> Self {
        init_tracing();
        let knobs = SharedKnobs::new(config.knobs);
        Self {
            engine: TemporalPrefetcher::new(config, knobs.clone()),
            store: LatencyMetadataStore::from_config(&config.store),
            log: PrefetchLog::new(),
            knobs,
            cycle: 0,
        }
    }

    /// Advances the engine and store by one tick with the context's prefetch log.
    pub fn tick(&mut self) {
        self.log.set_cycle(self.cycle);
        self.engine.tick(&mut self.log, &mut self.store);
        self.store.tick();
        self.cycle += 1;
    }

    /// Advances one tick with a caller-supplied prefetch port.
    pub fn tick_with(&mut self, port: &mut dyn PrefetchPort) {
        self.engine.tick(port, &mut self.store);
        self.store.tick();
        self.cycle += 1;
    }

    pub fn idle(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Offers `event` until the engine accepts it, then ticks once so it enters S1.
    pub fn feed(&mut self, event: TrainEvent) {
        for _ in 0..1000 {
            if self.engine.train(event) {
                self.tick();
                return;
            }
            self.tick();
        }
        panic!("engine never accepted {event:?}");
    }

    /// Feeds demand misses for every line in `lines`, in order.
    pub fn feed_lines(&mut self, lines: &[u64]) {
        for &l in lines {
            self.feed(TrainEvent::demand(line(l)));
        }
    }

    /// Ticks until the last fed event has left S2.
    pub fn settle(&mut self) {
        self.idle(3);
    }

    /// Ticks until the engine and store are idle.
    pub fn drain(&mut self, max: usize) {
        for _ in 0..max {
            if self.engine.is_idle() && self.store.is_idle() {
                return;
            }
            self.tick();
        }
        panic!("engine did not drain within {max} ticks");
    }

    /// Byte addresses of every prefetch issued so far.
    pub fn prefetched(&self) -> Vec<u64> {
        self.log.issued().iter().map(|p| p.request.addr).collect()
    }
}
