//! Usage-ordered, per-tier view of the cluster.

use super::holder::ServerHolder;
use std::collections::BTreeMap;

/// Servers of one tier, kept ordered by ascending percent used.
///
/// The order is established once per immutable snapshot, so retrieving the
/// extremes never requires a fresh sort.
#[derive(Debug, Clone, Default)]
pub struct TierServers {
    holders: Vec<ServerHolder>,
}

impl TierServers {
    pub fn new(mut holders: Vec<ServerHolder>) -> Self {
        holders.sort_by(|a, b| {
            a.percent_used()
                .partial_cmp(&b.percent_used())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { holders }
    }

    /// Insert a holder, maintaining the usage order.
    pub fn insert(&mut self, holder: ServerHolder) {
        let at = self
            .holders
            .partition_point(|h| h.percent_used() <= holder.percent_used());
        self.holders.insert(at, holder);
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ServerHolder> {
        self.holders.get(index)
    }

    pub fn least_used(&self) -> Option<&ServerHolder> {
        self.holders.first()
    }

    pub fn most_used(&self) -> Option<&ServerHolder> {
        self.holders.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServerHolder> {
        self.holders.iter()
    }

    /// Aggregate load picture of the tier.
    pub fn summary(&self) -> TierLoadSummary {
        if self.holders.is_empty() {
            return TierLoadSummary {
                balance_score: 100.0,
                ..TierLoadSummary::default()
            };
        }

        let usages: Vec<f64> = self.holders.iter().map(|h| h.percent_used()).collect();
        let mean = usages.iter().sum::<f64>() / usages.len() as f64;
        let variance =
            usages.iter().map(|u| (u - mean).powi(2)).sum::<f64>() / usages.len() as f64;
        let std_dev = variance.sqrt();

        TierLoadSummary {
            servers: self.holders.len(),
            min_percent_used: usages.iter().cloned().fold(f64::INFINITY, f64::min),
            max_percent_used: usages.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            mean_percent_used: mean,
            balance_score: (100.0 - std_dev).clamp(0.0, 100.0),
        }
    }
}

/// Aggregate load statistics for one tier (higher score = more balanced).
#[derive(Debug, Clone, Default)]
pub struct TierLoadSummary {
    pub servers: usize,
    pub min_percent_used: f64,
    pub max_percent_used: f64,
    pub mean_percent_used: f64,
    pub balance_score: f64,
}

/// Per-tier ordered collection of [`ServerHolder`]s.
///
/// One server belongs to exactly one tier; tiers are processed
/// independently.
#[derive(Debug, Clone, Default)]
pub struct ClusterView {
    tiers: BTreeMap<String, TierServers>,
}

impl ClusterView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tier(&mut self, tier: impl Into<String>, servers: TierServers) {
        self.tiers.insert(tier.into(), servers);
    }

    pub fn add_server(&mut self, tier: impl Into<String>, holder: ServerHolder) {
        self.tiers.entry(tier.into()).or_default().insert(holder);
    }

    pub fn tier(&self, name: &str) -> Option<&TierServers> {
        self.tiers.get(name)
    }

    pub fn tiers(&self) -> impl Iterator<Item = (&str, &TierServers)> {
        self.tiers.iter().map(|(name, servers)| (name.as_str(), servers))
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}
