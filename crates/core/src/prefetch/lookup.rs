//! Lookup Pipeline.
//!
//! A three-stage decision pipeline that turns each training event into a trigger table
//! hit/miss and an action:
//! 1. **S0 issue:** Filter the event, derive `(tag, set)` and read the set.
//! 2. **S1 resolve:** Compare tags; on a miss ask the replacement policy for a victim.
//! 3. **S2 decide:** Start a new trigger, continue the open recording, or drop.
//!
//! Stage registers advance once per tick like a shift register, so events leave S2 in
//! arrival order. Every lookup resolves in exactly one S1 step.

use crate::common::addr::LineAddr;
use crate::config::PrefetchKnobs;
use crate::prefetch::table::{SetView, TriggerTable};
use crate::prefetch::types::{TrainEvent, Trigger};

/// S0 → S1 stage register.
#[derive(Clone, Copy, Debug)]
pub struct IssueLatch {
    /// Event being looked up.
    pub event: TrainEvent,
    /// Training line address.
    pub addr: LineAddr,
    /// Table tag of `addr`.
    pub tag: u64,
    /// Table set of `addr`.
    pub set: usize,
    /// Set contents read in S0.
    pub view: SetView,
}

/// S1 → S2 stage register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolveLatch {
    /// Event being decided.
    pub event: TrainEvent,
    /// Training line address.
    pub addr: LineAddr,
    /// Table tag of `addr`.
    pub tag: u64,
    /// Table set of `addr`.
    pub set: usize,
    /// A valid way matched the tag.
    pub hit: bool,
    /// Matching way on a hit, victim way on a miss.
    pub way: usize,
    /// The victim way held a valid trigger.
    pub victim_valid: bool,
}

impl ResolveLatch {
    /// The trigger this event would anchor.
    pub const fn trigger(&self) -> Trigger {
        Trigger {
            addr: self.addr,
            way: self.way,
        }
    }
}

/// S2 outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Enqueue this event's address as a new trigger.
    StartTrigger(Trigger),
    /// Feed this event's address to the open recording.
    Record(LineAddr),
    /// Neither applies.
    Drop,
}

/// Recorder-side state S2 decides against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecideInputs {
    /// Triggers waiting in the trigger queue.
    pub queued_triggers: usize,
    /// The trigger queue accepts a push this tick.
    pub trigger_queue_ready: bool,
    /// A recording session is open.
    pub recording: bool,
}

/// Chooses the S2 action for a resolved event.
///
/// An event starts a new trigger when the table hit and hits count as triggers, or when
/// fewer than `trigger_enqueue_threshold` triggers are outstanding (queued plus the one
/// being recorded). Starting a trigger never interrupts the open recording, and an event
/// used as a trigger is not also recorded.
pub fn decide(resolved: &ResolveLatch, knobs: &PrefetchKnobs, state: DecideInputs) -> Action {
    let outstanding = state.queued_triggers + usize::from(state.recording);
    let wants_trigger = (knobs.hit_as_trigger && resolved.hit)
        || outstanding < knobs.trigger_enqueue_threshold;

    if wants_trigger && state.trigger_queue_ready {
        Action::StartTrigger(resolved.trigger())
    } else if state.recording {
        Action::Record(resolved.addr)
    } else {
        Action::Drop
    }
}

/// Returns the training line address of `event`, or `None` if the event does not qualify.
pub fn qualify(event: &TrainEvent, knobs: &PrefetchKnobs, block_offset_bits: u32) -> Option<LineAddr> {
    if event.source.is_prefetch() && !knobs.train_on_prefetch {
        return None;
    }
    let addr = if knobs.train_on_vaddr {
        event.vaddr?
    } else {
        event.addr
    };
    let line = LineAddr::from_byte(addr, block_offset_bits);
    (line.val() != 0).then_some(line)
}

/// Stage registers of the lookup pipeline.
#[derive(Debug, Default)]
pub struct LookupPipeline {
    s1: Option<IssueLatch>,
    s2: Option<ResolveLatch>,
}

impl LookupPipeline {
    /// Creates an empty pipeline.
    pub const fn new() -> Self {
        Self { s1: None, s2: None }
    }

    /// Returns true if no event is in flight.
    pub const fn is_empty(&self) -> bool {
        self.s1.is_none() && self.s2.is_none()
    }

    /// Number of events in flight.
    pub fn occupancy(&self) -> usize {
        usize::from(self.s1.is_some()) + usize::from(self.s2.is_some())
    }

    /// Advances every stage by one tick.
    ///
    /// `incoming` is the already-qualified event entering S0 with its line address. Returns
    /// the event reaching S2 this tick.
    pub fn tick(
        &mut self,
        incoming: Option<(TrainEvent, LineAddr)>,
        table: &mut TriggerTable,
    ) -> Option<ResolveLatch> {
        let decided = self.s2.take();
        self.s2 = self.s1.take().map(|latch| Self::resolve(&latch, table));
        self.s1 = incoming.map(|(event, addr)| Self::issue(event, addr, table));
        decided
    }

    /// S0: index the table and read the set.
    fn issue(event: TrainEvent, addr: LineAddr, table: &TriggerTable) -> IssueLatch {
        let (tag, set) = table.index(addr);
        IssueLatch {
            event,
            addr,
            tag,
            set,
            view: table.lookup(set),
        }
    }

    /// S1: tag compare and victim selection.
    fn resolve(latch: &IssueLatch, table: &mut TriggerTable) -> ResolveLatch {
        let (hit, way) = match latch.view.find(latch.tag) {
            Some(way) => {
                table.touch(latch.set, way);
                (true, way)
            }
            None => (false, table.victim(latch.set)),
        };
        ResolveLatch {
            event: latch.event,
            addr: latch.addr,
            tag: latch.tag,
            set: latch.set,
            hit,
            way,
            victim_valid: !hit && latch.view.entries()[way].valid,
        }
    }

    /// Drops every in-flight event.
    pub fn flush(&mut self) {
        self.s1 = None;
        self.s2 = None;
    }
}
