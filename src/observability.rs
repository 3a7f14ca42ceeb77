//! Logging and metrics for the balancing core.
//!
//! Metrics are recorded through the `metrics` facade only; installing a
//! recorder (and exposing it) belongs to the embedding process.

use crate::cluster::TierLoadSummary;
use crate::config::ObservabilityConfig;
use crate::error::{BasaltError, Result};
use metrics::{counter, gauge};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging.
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| BasaltError::Internal(format!("Failed to init logging: {}", e)))?;
    } else {
        subscriber
            .with(fmt::layer())
            .try_init()
            .map_err(|e| BasaltError::Internal(format!("Failed to init logging: {}", e)))?;
    }

    info!("Observability initialized");
    Ok(())
}

/// Record an issued segment move.
pub fn record_move(tier: &str) {
    counter!("basalt_balancer_moves_total", "tier" => tier.to_string()).increment(1);
}

/// Record a balancing cycle completion.
pub fn record_cycle() {
    counter!("basalt_balancer_cycles_total").increment(1);
}

/// Update per-tier load gauges from a cycle's summary.
pub fn update_tier_load(tier: &str, summary: &TierLoadSummary) {
    gauge!("basalt_tier_servers", "tier" => tier.to_string()).set(summary.servers as f64);
    gauge!("basalt_tier_mean_percent_used", "tier" => tier.to_string())
        .set(summary.mean_percent_used);
    gauge!("basalt_tier_balance_score", "tier" => tier.to_string()).set(summary.balance_score);
}
