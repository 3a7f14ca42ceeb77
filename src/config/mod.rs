//! Configuration module for the Basalt balancing core.

use crate::error::{BasaltError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration for the balancing core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasaltConfig {
    /// Balancer configuration.
    pub balancer: BalancerConfig,
    /// Background engine configuration.
    pub engine: EngineConfig,
    /// Observability configuration.
    pub observability: ObservabilityConfig,
}

impl BasaltConfig {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BasaltError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| BasaltError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.balancer.validate()?;

        if self.engine.cycle_interval.is_zero() {
            return Err(BasaltError::InvalidConfig {
                field: "engine.cycle_interval".to_string(),
                reason: "Cycle interval must be non-zero".to_string(),
            });
        }

        Ok(())
    }

    /// Create a minimal development configuration: a fast cycle and a small
    /// worker pool, suitable for a single-process cluster.
    pub fn development() -> Self {
        Self {
            balancer: BalancerConfig {
                cost: CostConfig {
                    workers: 2,
                    ..CostConfig::default()
                },
                ..BalancerConfig::default()
            },
            engine: EngineConfig {
                enabled: true,
                cycle_interval: Duration::from_secs(5),
            },
            observability: ObservabilityConfig {
                log_level: "debug".to_string(),
                json_logs: false,
            },
        }
    }
}

/// Admission policy for sampled moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionPolicy {
    /// Accept only moves with a negative cost differential.
    Strict,
    /// Accept any sampled move up to the budget; the cost differential is
    /// recorded for observability rather than used as a gate.
    #[default]
    Exploratory,
}

/// Balancer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancerConfig {
    /// Admission policy for sampled moves.
    #[serde(default)]
    pub admission: AdmissionPolicy,
    /// Consecutive unsuccessful samples before a tier is abandoned for the
    /// cycle.
    pub max_sampling_attempts: usize,
    /// Reject candidates when either endpoint's peon has at least this many
    /// queued operations.
    pub max_peon_backlog: usize,
    /// Cost model configuration.
    pub cost: CostConfig,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            admission: AdmissionPolicy::default(),
            max_sampling_attempts: 50,
            max_peon_backlog: 10,
            cost: CostConfig::default(),
        }
    }
}

impl BalancerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_sampling_attempts == 0 {
            return Err(BasaltError::InvalidConfig {
                field: "balancer.max_sampling_attempts".to_string(),
                reason: "Sampling attempts must be non-zero".to_string(),
            });
        }
        if self.max_peon_backlog == 0 {
            return Err(BasaltError::InvalidConfig {
                field: "balancer.max_peon_backlog".to_string(),
                reason: "Peon backlog threshold must be non-zero".to_string(),
            });
        }
        self.cost.validate()
    }
}

/// Cost model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostConfig {
    /// Half life of the recency discount; a segment whose interval ended
    /// this long ago contributes half the cost of fresh data.
    #[serde(with = "humantime_serde")]
    pub recency_half_life: Duration,
    /// Half life of the interval-distance discount; segments this far apart
    /// cost half as much as overlapping ones.
    #[serde(with = "humantime_serde")]
    pub gap_half_life: Duration,
    /// Worker tasks for pairwise evaluation over large resident sets.
    pub workers: usize,
    /// Resident-set size at which evaluation moves to the worker pool.
    pub parallel_threshold: usize,
    /// Deadline for one pooled evaluation; on expiry the partial aggregate
    /// is used.
    #[serde(with = "humantime_serde")]
    pub compute_deadline: Duration,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            recency_half_life: Duration::from_secs(7 * 24 * 3600),
            gap_half_life: Duration::from_secs(30 * 24 * 3600),
            workers: 4,
            parallel_threshold: 64,
            compute_deadline: Duration::from_secs(5),
        }
    }
}

impl CostConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(BasaltError::InvalidConfig {
                field: "balancer.cost.workers".to_string(),
                reason: "Worker count must be non-zero".to_string(),
            });
        }
        if self.recency_half_life.is_zero() || self.gap_half_life.is_zero() {
            return Err(BasaltError::InvalidConfig {
                field: "balancer.cost".to_string(),
                reason: "Half lives must be non-zero".to_string(),
            });
        }
        if self.compute_deadline.is_zero() {
            return Err(BasaltError::InvalidConfig {
                field: "balancer.cost.compute_deadline".to_string(),
                reason: "Compute deadline must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Background engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Enable the background balancing loop.
    pub enabled: bool,
    /// Interval between balancing cycles.
    #[serde(with = "humantime_serde")]
    pub cycle_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cycle_interval: Duration::from_secs(60),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level.
    pub log_level: String,
    /// Enable JSON logging.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Serde helper for Duration using humantime format.
///
/// Supports `ms`, `s`, `m`, `h`, and `d` suffixes; a bare number is
/// milliseconds.
pub mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}ms", duration.as_millis()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| e.to_string())
        } else if let Some(d) = s.strip_suffix('d') {
            d.parse::<u64>()
                .map(|v| Duration::from_secs(v * 24 * 3600))
                .map_err(|e| e.to_string())
        } else if let Some(h) = s.strip_suffix('h') {
            h.parse::<u64>()
                .map(|v| Duration::from_secs(v * 3600))
                .map_err(|e| e.to_string())
        } else if let Some(m) = s.strip_suffix('m') {
            m.parse::<u64>()
                .map(|v| Duration::from_secs(v * 60))
                .map_err(|e| e.to_string())
        } else if let Some(s_val) = s.strip_suffix('s') {
            s_val
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| e.to_string())
        } else {
            s.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| e.to_string())
        }
    }

}
