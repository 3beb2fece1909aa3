//! Boundary types exchanged with the surrounding cache slice.
//!
//! 1. **Training intake:** [`TrainEvent`] notifications from the cache pipeline.
//! 2. **Prefetch issue:** [`PrefetchRequest`] handed to the slice's request arbiter through
//!    a [`PrefetchPort`].
//! 3. **Prefetch completion:** [`PrefetchResponse`] acknowledgements.
//! 4. **Triggers:** The `{address, way}` key of a recording session.

use serde::{Deserialize, Serialize};

use crate::common::addr::LineAddr;

/// Prefetcher that generated a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PfSource {
    /// This engine.
    Temporal,
    /// A stride prefetcher.
    Stride,
    /// A stream prefetcher.
    Stream,
    /// A best-offset prefetcher.
    BestOffset,
    /// A next-line prefetcher.
    NextLine,
}

/// Origin of the access a train event describes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TrainSource {
    /// A demand access from a core.
    #[default]
    Demand,
    /// A prefetch request, tagged with the prefetcher that issued it.
    Prefetch(PfSource),
}

impl TrainSource {
    /// Returns true if the access was generated by a prefetcher.
    pub const fn is_prefetch(self) -> bool {
        matches!(self, Self::Prefetch(_))
    }
}

/// An observed cache access offered to the engine for training.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainEvent {
    /// Physical byte address.
    pub addr: u64,
    /// Virtual byte address, when the cache pipeline knows it.
    #[serde(default)]
    pub vaddr: Option<u64>,
    /// The access hit in the cache.
    #[serde(default)]
    pub hit: bool,
    /// The line hit was brought in by a prefetch.
    #[serde(default)]
    pub prefetched: bool,
    /// Who issued the access.
    #[serde(default)]
    pub source: TrainSource,
    /// The access hit in the metadata store's backing ways.
    #[serde(default)]
    pub meta_hit: bool,
}

impl TrainEvent {
    /// Builds a demand miss at `addr`.
    pub const fn demand(addr: u64) -> Self {
        Self {
            addr,
            vaddr: None,
            hit: false,
            prefetched: false,
            source: TrainSource::Demand,
            meta_hit: false,
        }
    }
}

/// A prefetch handed to the cache slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchRequest {
    /// Cache tag of the target line.
    pub tag: u64,
    /// Cache set of the target line.
    pub set: u64,
    /// Byte address of the target line.
    pub addr: u64,
    /// Request write permission.
    pub need_exclusive: bool,
    /// Identifier of the issuing engine.
    pub source: u32,
    /// Prefetcher kind.
    pub pf_source: PfSource,
}

/// Acknowledgement of a previously issued prefetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchResponse {
    /// The slice accepted the prefetch.
    pub accepted: bool,
}

/// Anchor of a recording session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    /// Trigger line address.
    pub addr: LineAddr,
    /// Trigger table way allocated to it.
    pub way: usize,
}

/// Consumer of emitted prefetches (the cache slice's request arbiter).
pub trait PrefetchPort {
    /// The consumer accepts a request this tick.
    fn ready(&self) -> bool;

    /// Hands over one request. Only called after `ready()` returned true in the same tick.
    fn issue(&mut self, req: PrefetchRequest);
}
