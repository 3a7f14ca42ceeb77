//! Cost-driven segment balancer.
//!
//! For each tier the balancer samples (source, destination, segment)
//! triples biased toward moving load off hot servers onto cold ones,
//! admits candidates against capacity and backlog constraints, evaluates
//! the local cost differential, and issues accepted moves through the
//! coordinator. The balancer keeps no state between cycles: every
//! invocation re-reads the world from the supplied [`RuntimeParams`] and
//! returns it with merged statistics, so restarts of the control plane
//! cannot strand it.

use super::cost::CostAnalyzer;
use super::holder::ServerHolder;
use super::params::RuntimeParams;
use super::stats::{BalancerStats, COST_CHANGE, MOVED_COUNT};
use super::view::TierServers;
use crate::config::{AdmissionPolicy, BalancerConfig};
use crate::coordinator::{Coordinator, MoveOutcome};
use crate::error::Result;
use crate::observability;
use crate::types::Segment;
use chrono::{DateTime, Utc};
use rand::seq::IteratorRandom;
use rand::{thread_rng, Rng};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Selects and issues segment relocations for one balancing cycle.
pub struct Balancer {
    coordinator: Arc<dyn Coordinator>,
    analyzer: CostAnalyzer,
    config: BalancerConfig,
}

impl Balancer {
    pub fn new(
        coordinator: Arc<dyn Coordinator>,
        analyzer: CostAnalyzer,
        config: BalancerConfig,
    ) -> Self {
        Self {
            coordinator,
            analyzer,
            config,
        }
    }

    /// Run one balancing cycle over the snapshot at reference time `now`,
    /// returning the snapshot with this cycle's statistics merged in.
    ///
    /// Tiers are processed independently; a single move budget is
    /// decremented across them in sequence.
    pub async fn run(&self, params: RuntimeParams, now: DateTime<Utc>) -> Result<RuntimeParams> {
        let mut stats = BalancerStats::new();
        let mut budget = params.max_moves();

        for (tier, servers) in params.cluster().tiers() {
            if budget == 0 {
                debug!(tier, "move budget exhausted before tier");
                break;
            }
            if servers.len() < 2 {
                debug!(
                    tier,
                    servers = servers.len(),
                    "skipping tier with fewer than two servers"
                );
                continue;
            }
            self.balance_tier(tier, servers, &params, now, &mut budget, &mut stats)
                .await?;
        }

        Ok(params.merge_stats(stats))
    }

    async fn balance_tier(
        &self,
        tier: &str,
        servers: &TierServers,
        params: &RuntimeParams,
        now: DateTime<Utc>,
        budget: &mut usize,
        stats: &mut BalancerStats,
    ) -> Result<()> {
        let mut misses = 0usize;
        let mut moved = 0usize;

        while *budget > 0 && misses < self.config.max_sampling_attempts {
            let Some((source, destination)) = self.sample_pair(servers) else {
                misses += 1;
                continue;
            };
            let Some(segment) = self.sample_segment(source, params) else {
                misses += 1;
                continue;
            };
            let id = segment.id();

            if destination.is_loading_or_hosting(&id) {
                misses += 1;
                continue;
            }
            if destination.available_size() < segment.size_bytes as i64 {
                debug!(
                    tier,
                    segment = %id,
                    destination = %destination.server().name,
                    "destination lacks capacity"
                );
                misses += 1;
                continue;
            }
            if self.backlogged(source, params) || self.backlogged(destination, params) {
                misses += 1;
                continue;
            }

            let cost = self.analyzer.move_cost(&segment, source, destination, now).await;
            if self.config.admission == AdmissionPolicy::Strict && cost >= 0.0 {
                debug!(tier, segment = %id, cost, "rejecting move with nonnegative cost");
                misses += 1;
                continue;
            }

            let from = source.server().name.clone();
            let to = destination.server().name.clone();
            let callback_id = id.clone();
            self.coordinator
                .move_segment(
                    &from,
                    &to,
                    &id,
                    Box::new(move |outcome| {
                        if let MoveOutcome::Failed(reason) = outcome {
                            warn!(segment = %callback_id, %reason, "segment move failed");
                        }
                    }),
                )
                .await?;

            info!(tier, segment = %id, %from, %to, cost, "issued segment move");
            observability::record_move(tier);
            stats.add_tiered(MOVED_COUNT, tier, 1.0);
            stats.add_tiered(COST_CHANGE, tier, cost);
            *budget -= 1;
            moved += 1;
            misses = 0;
        }

        if moved == 0 {
            debug!(tier, "no eligible relocation found this cycle");
        }
        Ok(())
    }

    /// Sample a distinct (source, destination) pair from the tier. Source
    /// selection is biased toward the more used holder and destination
    /// toward the less used one, with enough randomness to avoid
    /// oscillating on the same pair across cycles.
    fn sample_pair<'a>(
        &self,
        servers: &'a TierServers,
    ) -> Option<(&'a ServerHolder, &'a ServerHolder)> {
        let mut rng = thread_rng();
        let source = pick_biased(servers, &mut rng, Bias::MostUsed)?;
        for _ in 0..4 {
            let destination = pick_biased(servers, &mut rng, Bias::LeastUsed)?;
            if destination.server().name != source.server().name {
                return Some((source, destination));
            }
        }
        None
    }

    /// Sample a candidate segment hosted on the source, restricted to the
    /// cycle's authoritative available set.
    fn sample_segment(&self, source: &ServerHolder, params: &RuntimeParams) -> Option<Segment> {
        let mut rng = thread_rng();
        source
            .server()
            .segments
            .values()
            .filter(|s| params.is_available(&s.id()))
            .choose(&mut rng)
            .cloned()
    }

    fn backlogged(&self, holder: &ServerHolder, params: &RuntimeParams) -> bool {
        let depth = params
            .peon(&holder.server().name)
            .map(|p| p.queue_depth())
            .unwrap_or_else(|| holder.peon().queue_depth());
        depth >= self.config.max_peon_backlog
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Bias {
    MostUsed,
    LeastUsed,
}

/// Two-choice sampling over the usage-ordered tier: draw two indexes and
/// keep the extreme one. The view sorts ascending, so the higher index is
/// the more used holder.
fn pick_biased<'a>(
    servers: &'a TierServers,
    rng: &mut impl Rng,
    bias: Bias,
) -> Option<&'a ServerHolder> {
    if servers.is_empty() {
        return None;
    }
    let a = rng.gen_range(0..servers.len());
    let b = rng.gen_range(0..servers.len());
    let index = match bias {
        Bias::MostUsed => a.max(b),
        Bias::LeastUsed => a.min(b),
    };
    servers.get(index)
}
