// src/models/stats_models.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Counters for one scheduler round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoundStats {
    pub round: usize,
    pub active_clusters: usize,
    pub pairs_scheduled: usize,
    pub terminal_empty: usize,
    pub forfeited: usize,
    /// Terminal-empty clusters emitted by the per-round harvest.
    pub harvested: usize,
    /// Terminal-empty clusters rejected by the size (or harvest) filter.
    pub discarded: usize,
}

/// Summary of a full clustering run.
#[derive(Debug, Clone, Serialize)]
pub struct ClusteringStats {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub records_in: usize,
    pub eligible_records: usize,
    pub retained_tags: usize,
    pub first_round_stars: usize,
    pub duplicate_stars_removed: usize,
    pub rounds: Vec<RoundStats>,
    pub flushed: usize,
    pub total_clusters: usize,
    pub elapsed_secs: f64,
    pub signature: String,
}

impl ClusteringStats {
    pub fn harvested(&self) -> usize {
        self.rounds.iter().map(|round| round.harvested).sum()
    }

    pub fn forfeited(&self) -> usize {
        self.rounds.iter().map(|round| round.forfeited).sum()
    }
}
