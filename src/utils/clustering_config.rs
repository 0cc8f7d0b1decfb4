// src/utils/clustering_config.rs

use log::{debug, info};
use std::env;
use std::str::FromStr;

use crate::error::{ClusteringError, Result};
use crate::utils::constants::{DEFAULT_MIN_ELEMENTS_IN_CLUSTER, DEFAULT_MIN_SIMILARITY_FIRST_ROUND};

/// Parameters of a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringConfig {
    /// Size floor for clusters emitted by the per-round harvest.
    pub min_elements_in_cluster: usize,
    /// Record-level threshold, strict.
    pub min_similarity_first_round: f64,
    /// Cluster-level threshold, inclusive. `None` reuses the first-round value.
    pub min_similarity_next_rounds: Option<f64>,
    /// Compute similarity passes on the rayon pool.
    pub parallel: bool,
    /// Emit start/end timing lines through the clustering logger.
    pub log_timing: bool,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_elements_in_cluster: DEFAULT_MIN_ELEMENTS_IN_CLUSTER,
            min_similarity_first_round: DEFAULT_MIN_SIMILARITY_FIRST_ROUND,
            min_similarity_next_rounds: None,
            parallel: true,
            log_timing: true,
        }
    }
}

impl ClusteringConfig {
    /// Create configuration from environment variables, falling back to the
    /// defaults for anything missing or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            min_elements_in_cluster: env_or("CLUSTERING_MIN_ELEMENTS", defaults.min_elements_in_cluster),
            min_similarity_first_round: env_or(
                "CLUSTERING_MIN_SIMILARITY_FIRST",
                defaults.min_similarity_first_round,
            ),
            min_similarity_next_rounds: env::var("CLUSTERING_MIN_SIMILARITY_NEXT")
                .ok()
                .and_then(|value| value.trim().parse().ok()),
            parallel: env_or("CLUSTERING_PARALLEL", defaults.parallel),
            log_timing: env_or("CLUSTERING_LOG_TIMING", defaults.log_timing),
        };
        debug!("Clustering config from env: {:?}", config);
        config
    }

    /// Threshold used for cluster-level comparisons.
    pub fn next_round_threshold(&self) -> f64 {
        self.min_similarity_next_rounds
            .unwrap_or(self.min_similarity_first_round)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_elements_in_cluster < 1 {
            return Err(ClusteringError::invalid_parameter(
                "min_elements_in_cluster",
                "must be at least 1",
            ));
        }
        check_unit_interval("min_similarity_first_round", self.min_similarity_first_round)?;
        if let Some(next) = self.min_similarity_next_rounds {
            check_unit_interval("min_similarity_next_rounds", next)?;
        }
        Ok(())
    }

    pub fn log_config(&self) {
        info!("🔧 Clustering configuration:");
        info!("   Minimum elements per harvested cluster: {}", self.min_elements_in_cluster);
        info!("   First-round similarity (strict): {:.3}", self.min_similarity_first_round);
        match self.min_similarity_next_rounds {
            Some(next) => info!("   Next-rounds similarity (inclusive): {:.3}", next),
            None => info!(
                "   Next-rounds similarity (inclusive): {:.3} (first-round value)",
                self.next_round_threshold()
            ),
        }
        info!(
            "   Similarity passes: {}",
            if self.parallel { "parallel" } else { "sequential" }
        );
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn check_unit_interval(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ClusteringError::invalid_parameter(
            name,
            format!("must be within [0, 1], got {}", value),
        ));
    }
    Ok(())
}
