//! Immutable per-cycle snapshot threaded through the balancer.

use super::stats::BalancerStats;
use super::view::ClusterView;
use crate::coordinator::Peon;
use crate::types::{Segment, SegmentId, ServerName};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Everything one balancing cycle is allowed to see: the cluster view, the
/// per-server peons, the authoritative available-segment set, the move
/// budget, and the statistics produced by earlier stages of the cycle.
///
/// The balancer never keeps state between cycles; it re-reads the world
/// from a fresh snapshot on every invocation and returns the snapshot with
/// its statistics merged in.
#[derive(Clone)]
pub struct RuntimeParams {
    cluster: ClusterView,
    peons: HashMap<ServerName, Arc<dyn Peon>>,
    available_segments: HashMap<SegmentId, Segment>,
    max_moves: usize,
    stats: BalancerStats,
}

impl RuntimeParams {
    pub fn builder() -> RuntimeParamsBuilder {
        RuntimeParamsBuilder::default()
    }

    pub fn cluster(&self) -> &ClusterView {
        &self.cluster
    }

    pub fn peon(&self, server: &str) -> Option<&Arc<dyn Peon>> {
        self.peons.get(server)
    }

    pub fn available_segments(&self) -> &HashMap<SegmentId, Segment> {
        &self.available_segments
    }

    /// Whether the segment is in the cycle's authoritative set. Segments
    /// mid-removal or unknown to the coordinator are ineligible to move.
    pub fn is_available(&self, id: &SegmentId) -> bool {
        self.available_segments.contains_key(id)
    }

    pub fn max_moves(&self) -> usize {
        self.max_moves
    }

    pub fn stats(&self) -> &BalancerStats {
        &self.stats
    }

    /// Fold a cycle's delta into the carried statistics.
    pub(crate) fn merge_stats(mut self, delta: BalancerStats) -> Self {
        self.stats.merge(delta);
        self
    }
}

impl fmt::Debug for RuntimeParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeParams")
            .field("tiers", &self.cluster.tiers().count())
            .field("peons", &self.peons.len())
            .field("available_segments", &self.available_segments.len())
            .field("max_moves", &self.max_moves)
            .finish()
    }
}

/// Builder for [`RuntimeParams`].
#[derive(Default)]
pub struct RuntimeParamsBuilder {
    cluster: ClusterView,
    peons: HashMap<ServerName, Arc<dyn Peon>>,
    available_segments: HashMap<SegmentId, Segment>,
    max_moves: usize,
    stats: BalancerStats,
}

impl RuntimeParamsBuilder {
    pub fn with_cluster(mut self, cluster: ClusterView) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn with_peons(mut self, peons: HashMap<ServerName, Arc<dyn Peon>>) -> Self {
        self.peons = peons;
        self
    }

    pub fn with_peon(mut self, server: impl Into<String>, peon: Arc<dyn Peon>) -> Self {
        self.peons.insert(server.into(), peon);
        self
    }

    pub fn with_available_segments(
        mut self,
        segments: impl IntoIterator<Item = Segment>,
    ) -> Self {
        self.available_segments = segments.into_iter().map(|s| (s.id(), s)).collect();
        self
    }

    pub fn with_max_moves(mut self, max_moves: usize) -> Self {
        self.max_moves = max_moves;
        self
    }

    /// Carry statistics accumulated by earlier stages of the cycle.
    pub fn with_stats(mut self, stats: BalancerStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn build(self) -> RuntimeParams {
        RuntimeParams {
            cluster: self.cluster,
            peons: self.peons,
            available_segments: self.available_segments,
            max_moves: self.max_moves,
            stats: self.stats,
        }
    }
}
