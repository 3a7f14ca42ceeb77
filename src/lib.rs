//! Basalt - segment balancing for a distributed column store control plane.
//!
//! Basalt's control plane re-evaluates segment placement on every cycle.
//! This crate is the part that decides which already-placed segments should
//! relocate between servers of the same tier: a cost model over segment
//! affinity, randomized sampling under capacity and backlog constraints,
//! and per-tier/per-cycle move budgets. Everything around it (segment
//! discovery, leader election, the admin surface, actual byte transfer)
//! stays behind two narrow traits.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   Control plane (external)                   │
//! │   discovery | leadership | admin API | execution queues      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  RuntimeParams snapshot ──► Balancer ──► move intents        │
//! │        │                      │                              │
//! │   ClusterView           CostAnalyzer                         │
//! │   (tier → usage-        (pairwise affinity,                  │
//! │    ordered servers)      bounded worker pool)                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use basalt::cluster::{Balancer, CostAnalyzer, RuntimeParams};
//! use basalt::config::BasaltConfig;
//! use std::sync::Arc;
//!
//! # async fn cycle(coordinator: Arc<dyn basalt::coordinator::Coordinator>) -> basalt::Result<()> {
//! let config = BasaltConfig::development();
//! let balancer = Balancer::new(
//!     coordinator,
//!     CostAnalyzer::new(config.balancer.cost.clone()),
//!     config.balancer,
//! );
//!
//! // One snapshot in, the same snapshot plus merged statistics out.
//! let snapshot = RuntimeParams::builder().with_max_moves(5).build();
//! let snapshot = balancer.run(snapshot, chrono::Utc::now()).await?;
//! println!("moved {} segments", snapshot.stats().moved_count("normal"));
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod observability;
pub mod types;

// Re-exports
pub use cluster::{
    BalanceEngine, Balancer, BalancerStats, ClusterView, CostAnalyzer, RuntimeParams,
    ServerHolder, SnapshotSource, TierLoadSummary, TierServers,
};
pub use error::{BasaltError, Result};
pub use types::{Segment, SegmentId, SegmentInterval, Server, ShardSpec};
