//! Cluster view and segment balancing.
//!
//! This module holds the balancing core:
//! - Usage-ordered cluster view and per-server holders
//! - Placement cost model
//! - The balancer and its per-cycle snapshot/statistics types
//! - A background engine driving the balancer per cycle

mod balancer;
mod cost;
mod engine;
mod holder;
mod params;
mod stats;
mod view;

pub use balancer::Balancer;
pub use cost::CostAnalyzer;
pub use engine::{BalanceEngine, SnapshotSource};
pub use holder::ServerHolder;
pub use params::{RuntimeParams, RuntimeParamsBuilder};
pub use stats::{BalancerStats, COST_CHANGE, MOVED_COUNT};
pub use view::{ClusterView, TierLoadSummary, TierServers};
