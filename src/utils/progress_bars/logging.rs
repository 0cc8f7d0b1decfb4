// src/utils/progress_bars/logging.rs - Run and round logging for the clustering pipeline
use chrono::{DateTime, Local};
use log::{info, warn};
use std::time::{Duration, Instant};

use crate::models::RoundStats;

const PREFIX: &str = "[CLUSTERING]";

#[derive(Debug, Clone)]
pub struct ClusteringLogger {
    start_time: Instant,
    started_at: DateTime<Local>,
    log_timing: bool,
}

impl ClusteringLogger {
    pub fn new(log_timing: bool) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Local::now(),
            log_timing,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn log_start(&self, run_id: &str, records_in: usize) {
        info!(
            "{} 🚀 Starting tag clustering (run ID: {}) over {} records",
            PREFIX, run_id, records_in
        );
        if self.log_timing {
            info!("{} 🕒 Started at {}", PREFIX, self.started_at.format("%H:%M:%S"));
        }
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.start_time.elapsed();
        match details {
            Some(details) => info!(
                "{} 🔄 Phase: {} - {} [+{:.1}s]",
                PREFIX,
                phase,
                details,
                elapsed.as_secs_f32()
            ),
            None => info!("{} 🔄 Phase: {} [+{:.1}s]", PREFIX, phase, elapsed.as_secs_f32()),
        }
    }

    pub fn log_preparation(&self, records_in: usize, eligible: usize, distinct_tags: usize, retained_tags: usize) {
        info!(
            "{} 📊 Preparation: {} records in → {} eligible; {} distinct tags → {} retained (seen more than once)",
            PREFIX, records_in, eligible, distinct_tags, retained_tags
        );
        if eligible == 0 && records_in > 0 {
            warn!("{} ⚠️  No record shares a tag with another record; output will be empty", PREFIX);
        }
    }

    pub fn log_first_round(&self, stars_built: usize, duplicates_removed: usize) {
        info!(
            "{} ⭐ First round: {} stars built, {} exact duplicates removed → {} clusters",
            PREFIX,
            stars_built,
            duplicates_removed,
            stars_built - duplicates_removed
        );
    }

    pub fn log_round(&self, stats: &RoundStats) {
        info!(
            "{} 🔁 Round {}: {} active, {} pairs scheduled, {} terminal, {} forfeited, {} harvested, {} discarded",
            PREFIX,
            stats.round,
            stats.active_clusters,
            stats.pairs_scheduled,
            stats.terminal_empty,
            stats.forfeited,
            stats.harvested,
            stats.discarded
        );
    }

    pub fn log_flush(&self, remaining: usize, appended: usize) {
        info!(
            "{} 🧹 Final flush: {} remaining clusters, {} appended without size filter",
            PREFIX, remaining, appended
        );
    }

    pub fn log_completion(&self, total_clusters: usize, signature: &str) {
        let duration = self.start_time.elapsed();
        info!(
            "{} 🎉 COMPLETED: {} clusters (signature {})",
            PREFIX,
            total_clusters,
            short_signature(signature)
        );
        if self.log_timing {
            info!(
                "{} 🕒 Finished at {} after {}",
                PREFIX,
                Local::now().format("%H:%M:%S"),
                format_elapsed(duration)
            );
        }
    }
}

/// `M:SS` rendering of a run duration.
pub fn format_elapsed(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

fn short_signature(signature: &str) -> &str {
    signature.get(..12).unwrap_or(signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "0:00");
        assert_eq!(format_elapsed(Duration::from_millis(65_900)), "1:05");
        assert_eq!(format_elapsed(Duration::from_secs(3_601)), "60:01");
    }

    #[test]
    fn test_short_signature() {
        assert_eq!(short_signature("abcdef0123456789"), "abcdef012345");
        assert_eq!(short_signature("abc"), "abc");
    }
}
