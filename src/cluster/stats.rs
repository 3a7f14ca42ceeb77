//! Per-cycle statistics accumulator.
//!
//! Statistics are threaded through tier processing as an explicit value and
//! merged once per cycle; nothing here survives past the cycle's report.

use std::collections::HashMap;

/// Stat name for the number of issued moves.
pub const MOVED_COUNT: &str = "movedCount";

/// Stat name for the accumulated signed cost change of issued moves.
pub const COST_CHANGE: &str = "costChange";

/// Accumulator keyed by statistic name, then tier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalancerStats {
    tiered: HashMap<String, HashMap<String, f64>>,
}

impl BalancerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to a per-tier statistic, creating it on first use.
    pub fn add_tiered(&mut self, stat: &str, tier: &str, delta: f64) {
        *self
            .tiered
            .entry(stat.to_string())
            .or_default()
            .entry(tier.to_string())
            .or_insert(0.0) += delta;
    }

    /// Current value of a per-tier statistic; zero when never touched.
    pub fn get(&self, stat: &str, tier: &str) -> f64 {
        self.tiered
            .get(stat)
            .and_then(|tiers| tiers.get(tier))
            .copied()
            .unwrap_or(0.0)
    }

    /// All tiers recorded under one statistic.
    pub fn per_tier(&self, stat: &str) -> Option<&HashMap<String, f64>> {
        self.tiered.get(stat)
    }

    pub fn moved_count(&self, tier: &str) -> u64 {
        self.get(MOVED_COUNT, tier) as u64
    }

    pub fn cost_change(&self, tier: &str) -> f64 {
        self.get(COST_CHANGE, tier)
    }

    /// Fold another accumulator into this one, adding matching entries.
    pub fn merge(&mut self, other: BalancerStats) {
        for (stat, tiers) in other.tiered {
            for (tier, value) in tiers {
                self.add_tiered(&stat, &tier, value);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tiered.is_empty()
    }
}
