//! Placement cost model.
//!
//! Cost is a pure function of segment pairs and a reference time. Two
//! segments of the same datasource cost more the closer their intervals
//! sit (co-locating consecutive time ranges hurts query parallelism), and
//! every pair is discounted exponentially as the data ages (cold data
//! draws less query pressure). Segments of different datasources never
//! contribute.
//!
//! Evaluation over large resident sets is fanned out to a bounded set of
//! worker tasks with a deadline; on expiry the partial aggregate is used,
//! since stalling the control cycle is worse than an imprecise estimate
//! for one cycle.

use super::holder::ServerHolder;
use crate::config::CostConfig;
use crate::types::{Segment, Server};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::warn;

/// Computes placement cost for segment pairs, servers, and candidate moves.
#[derive(Debug, Clone)]
pub struct CostAnalyzer {
    config: CostConfig,
}

impl CostAnalyzer {
    pub fn new(config: CostConfig) -> Self {
        Self { config }
    }

    /// Affinity cost of hosting `a` and `b` together at `now`.
    ///
    /// Deterministic and side-effect free: identical inputs always yield
    /// the identical value. Symmetric in its segment arguments.
    pub fn pair_cost(&self, a: &Segment, b: &Segment, now: DateTime<Utc>) -> f64 {
        if a.datasource != b.datasource {
            return 0.0;
        }

        let base = a.size_bytes.min(b.size_bytes) as f64;
        let gap_half_life = self.config.gap_half_life.as_secs_f64();
        let gap_factor = (-a.interval.gap_seconds(&b.interval) / gap_half_life).exp2();

        base * gap_factor * self.recency_factor(a, now) * self.recency_factor(b, now)
    }

    /// Exponential discount on a segment's distance from `now`. Intervals
    /// ending in the future count as fresh.
    fn recency_factor(&self, segment: &Segment, now: DateTime<Utc>) -> f64 {
        let age_seconds = (now - segment.interval.end).num_milliseconds().max(0) as f64 / 1000.0;
        (-age_seconds / self.config.recency_half_life.as_secs_f64()).exp2()
    }

    /// Joint cost of `segment` against a resident set.
    pub async fn cost_against(
        &self,
        segment: &Segment,
        residents: &[Segment],
        now: DateTime<Utc>,
    ) -> f64 {
        if residents.is_empty() || residents.len() < self.config.parallel_threshold {
            return residents
                .iter()
                .map(|r| self.pair_cost(segment, r, now))
                .sum();
        }

        let residents: Arc<[Segment]> = residents.to_vec().into();
        let mut workers = JoinSet::new();
        let chunk = residents.len().div_ceil(self.config.workers);
        for (index, lo) in (0..residents.len()).step_by(chunk).enumerate() {
            let hi = (lo + chunk).min(residents.len());
            let residents = Arc::clone(&residents);
            let segment = segment.clone();
            let analyzer = self.clone();
            workers.spawn(async move {
                let part = residents[lo..hi]
                    .iter()
                    .map(|r| analyzer.pair_cost(&segment, r, now))
                    .sum::<f64>();
                (index, part)
            });
        }
        self.drain_workers(workers).await
    }

    /// Total cost over unordered pairs of a server's residents. Self pairs
    /// excluded, each pair counted once.
    pub async fn server_cost(&self, server: &Server, now: DateTime<Utc>) -> f64 {
        let residents: Vec<Segment> = server.segments.values().cloned().collect();
        if residents.len() < 2 {
            return 0.0;
        }

        if residents.len() < self.config.parallel_threshold {
            let mut total = 0.0;
            for (i, a) in residents.iter().enumerate() {
                for b in &residents[i + 1..] {
                    total += self.pair_cost(a, b, now);
                }
            }
            return total;
        }

        // Stripe the outer index across workers so early rows (which pair
        // with the most partners) spread evenly.
        let residents: Arc<[Segment]> = residents.into();
        let workers = self.config.workers;
        let mut pool = JoinSet::new();
        for worker in 0..workers {
            let residents = Arc::clone(&residents);
            let analyzer = self.clone();
            pool.spawn(async move {
                let mut part = 0.0;
                let mut i = worker;
                while i < residents.len() {
                    let a = &residents[i];
                    for b in &residents[i + 1..] {
                        part += analyzer.pair_cost(a, b, now);
                    }
                    i += workers;
                }
                (worker, part)
            });
        }
        self.drain_workers(pool).await
    }

    /// Cost differential of relocating `segment` from `from` to `to`: its
    /// joint cost against the destination's residents minus its joint cost
    /// against the source's other residents. Negative means net
    /// improvement. Restricted to the two endpoints, O(server size).
    pub async fn move_cost(
        &self,
        segment: &Segment,
        from: &ServerHolder,
        to: &ServerHolder,
        now: DateTime<Utc>,
    ) -> f64 {
        let id = segment.id();
        let from_others = from.residents_except(Some(&id));
        let to_residents = to.residents_except(Some(&id));

        let (cost_at_destination, cost_at_source) = tokio::join!(
            self.cost_against(segment, &to_residents, now),
            self.cost_against(segment, &from_others, now),
        );
        cost_at_destination - cost_at_source
    }

    /// Collect worker partials, keeping the aggregation order deterministic
    /// and degrading to a partial sum once the deadline passes.
    async fn drain_workers(&self, mut workers: JoinSet<(usize, f64)>) -> f64 {
        let deadline = Instant::now() + self.config.compute_deadline;
        let mut parts = vec![None; workers.len()];
        let mut dropped = 0usize;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, workers.join_next()).await {
                Ok(Some(Ok((index, part)))) => parts[index] = Some(part),
                Ok(Some(Err(err))) => {
                    warn!(error = %err, "cost worker failed");
                    dropped += 1;
                }
                Ok(None) => break,
                Err(_) => {
                    dropped += workers.len();
                    workers.abort_all();
                    break;
                }
            }
        }

        if dropped > 0 {
            warn!(
                dropped,
                deadline_ms = self.config.compute_deadline.as_millis() as u64,
                "cost evaluation degraded to partial aggregate"
            );
        }
        parts.into_iter().flatten().sum()
    }
}
