//! Background balancing engine.
//!
//! A thin driver around [`Balancer`]: once per cycle interval it pulls a
//! fresh snapshot from the surrounding control plane, runs the balancer,
//! and reports per-tier results. Cycle failures are logged and the loop
//! continues; the next snapshot supersedes anything a failed cycle left
//! behind.

use super::balancer::Balancer;
use super::params::RuntimeParams;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::observability;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Supplies the per-cycle snapshot from the surrounding control plane.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn snapshot(&self) -> Result<RuntimeParams>;
}

/// Drives the balancer once per configured interval.
pub struct BalanceEngine {
    balancer: Balancer,
    source: Arc<dyn SnapshotSource>,
    config: EngineConfig,
    shutdown: tokio::sync::watch::Sender<bool>,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl BalanceEngine {
    pub fn new(balancer: Balancer, source: Arc<dyn SnapshotSource>, config: EngineConfig) -> Self {
        let (shutdown, shutdown_rx) = tokio::sync::watch::channel(false);
        Self {
            balancer,
            source,
            config,
            shutdown,
            shutdown_rx,
        }
    }

    /// Run the balancing loop until shutdown.
    pub async fn run(&self) {
        if !self.config.enabled {
            info!("Balancing engine disabled");
            return;
        }

        info!(
            interval_ms = self.config.cycle_interval.as_millis() as u64,
            "Starting balancing engine"
        );

        let mut interval = tokio::time::interval(self.config.cycle_interval);
        let mut shutdown_rx = self.shutdown_rx.clone();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Balancing engine shutting down");
                        break;
                    }
                }
                _ = interval.tick() => {
                    match self.run_cycle().await {
                        Ok(_) => debug!("Balancing cycle completed"),
                        Err(e) => error!(error = %e, "Balancing cycle failed"),
                    }
                }
            }
        }
    }

    /// Run a single balancing cycle and report its results.
    pub async fn run_cycle(&self) -> Result<RuntimeParams> {
        let params = self.source.snapshot().await?;
        let params = self.balancer.run(params, Utc::now()).await?;

        for (tier, servers) in params.cluster().tiers() {
            let summary = servers.summary();
            observability::update_tier_load(tier, &summary);
            info!(
                tier,
                moved = params.stats().moved_count(tier),
                cost_change = params.stats().cost_change(tier),
                balance_score = summary.balance_score,
                "tier balancing complete"
            );
        }
        observability::record_cycle();

        Ok(params)
    }

    /// Signal the engine loop to stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}
