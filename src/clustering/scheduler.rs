// src/clustering/scheduler.rs
//
// Iterative greedy coalescence of first-round stars.
//
// Every round works on an arena of clusters whose ids equal their position
// (ascending by size). A round is: cluster-level similarity pass (parallel),
// sequential claim pass, per-round harvest of terminal clusters, then either
// merge of the scheduled pairs or, when nothing was scheduled, the final
// flush and termination.

use indicatif::ProgressBar;
use log::{debug, info};
use rayon::prelude::*;

use crate::clustering::harvest::{flush_remaining_clusters, harvest_terminal_clusters, HarvestFilter};
use crate::clustering::similarity::{cluster_similarity, SimilaritySinks};
use crate::models::{order_by_size, Cluster, FinalCluster, RoundStats};
use crate::utils::progress_bars::logging::ClusteringLogger;

/// A qualifying merge candidate of some cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: usize,
    pub similarity: f64,
}

/// Outcome of one sequential claim pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimPass {
    /// Scheduled merges as `(requester, top neighbor)`, in processing order.
    pub pairs: Vec<(usize, usize)>,
    /// Clusters with no qualifying neighbor.
    pub terminal_empty: Vec<usize>,
    /// Clusters whose top neighbor was already claimed when their turn came.
    pub forfeited: Vec<usize>,
    /// Claim markers indexed by cluster id, as they stand after the pass.
    pub claimed: Vec<bool>,
}

impl ClaimPass {
    /// Forfeited clusters nobody claimed: these leave the run entirely.
    pub fn dropped(&self) -> Vec<usize> {
        self.forfeited
            .iter()
            .copied()
            .filter(|&id| !self.claimed[id])
            .collect()
    }
}

/// Greedy winner-take-all pairing over neighbor lists sorted best-first.
///
/// Clusters are processed in ascending id order. A cluster whose best
/// neighbor is already claimed does not fall back to its next-best one; its
/// request is forfeited for the round. Only the neighbor is checked, so a
/// cluster claimed earlier in the pass may still schedule a pair of its own.
pub fn claim_pass(neighbors: &[Vec<Neighbor>]) -> ClaimPass {
    let mut pass = ClaimPass {
        claimed: vec![false; neighbors.len()],
        ..ClaimPass::default()
    };

    for (id, candidates) in neighbors.iter().enumerate() {
        let Some(top) = candidates.first() else {
            pass.terminal_empty.push(id);
            continue;
        };

        if pass.claimed[top.id] {
            pass.forfeited.push(id);
            continue;
        }

        pass.claimed[id] = true;
        pass.claimed[top.id] = true;
        pass.pairs.push((id, top.id));
    }

    pass
}

/// Everything the scheduler hands back to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct SchedulerOutcome {
    /// Harvested and flushed clusters in discovery order.
    pub final_clusters: Vec<FinalCluster>,
    pub rounds: Vec<RoundStats>,
    /// Clusters appended by the final flush.
    pub flushed: usize,
}

pub struct GreedyMergeScheduler<'a> {
    min_similarity: f64,
    min_elements_in_cluster: usize,
    parallel: bool,
    sinks: &'a SimilaritySinks,
    harvest_filter: Option<&'a dyn HarvestFilter>,
    progress: Option<ProgressBar>,
    logger: Option<&'a ClusteringLogger>,
}

impl<'a> GreedyMergeScheduler<'a> {
    /// `min_similarity` is the cluster-level threshold (inclusive).
    pub fn new(min_similarity: f64, min_elements_in_cluster: usize, sinks: &'a SimilaritySinks) -> Self {
        Self {
            min_similarity,
            min_elements_in_cluster,
            parallel: true,
            sinks,
            harvest_filter: None,
            progress: None,
            logger: None,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_harvest_filter(mut self, filter: Option<&'a dyn HarvestFilter>) -> Self {
        self.harvest_filter = filter;
        self
    }

    pub fn with_progress(mut self, progress: Option<ProgressBar>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_logger(mut self, logger: Option<&'a ClusteringLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Runs rounds until a claim pass schedules no pair.
    ///
    /// `clusters` must already be in scheduler order (ascending by size);
    /// ids are renumbered to positions but the order is kept as given.
    pub fn run(&self, clusters: Vec<Cluster>) -> SchedulerOutcome {
        let mut active: Vec<Cluster> = clusters
            .into_iter()
            .enumerate()
            .map(|(position, mut cluster)| {
                cluster.id = position;
                cluster
            })
            .collect();

        let mut outcome = SchedulerOutcome::default();
        let mut round = 0;

        loop {
            round += 1;
            if let Some(pb) = &self.progress {
                pb.set_message(format!("Round {} ({} active clusters)", round, active.len()));
                pb.tick();
            }

            let neighbors = self.similarity_pass(&active);
            let pass = claim_pass(&neighbors);

            let summary = harvest_terminal_clusters(
                &active,
                &pass.terminal_empty,
                &pass.claimed,
                self.min_elements_in_cluster,
                self.harvest_filter,
                &mut outcome.final_clusters,
            );

            let stats = RoundStats {
                round,
                active_clusters: active.len(),
                pairs_scheduled: pass.pairs.len(),
                terminal_empty: pass.terminal_empty.len(),
                forfeited: pass.dropped().len(),
                harvested: summary.harvested,
                discarded: summary.discarded,
            };
            match self.logger {
                Some(logger) => logger.log_round(&stats),
                None => debug!("Round {}: {:?}", round, stats),
            }
            outcome.rounds.push(stats);

            if pass.pairs.is_empty() {
                // Clusters entering a round that merged nothing were themselves
                // produced by a merge only from round 2 on.
                if round > 1 {
                    outcome.flushed = flush_remaining_clusters(&active, &mut outcome.final_clusters);
                    if let Some(logger) = self.logger {
                        logger.log_flush(active.len(), outcome.flushed);
                    }
                }
                break;
            }

            active = merge_pairs(&active, &pass.pairs);
        }

        if let Some(pb) = &self.progress {
            pb.finish_with_message(format!(
                "Merging done: {} rounds, {} clusters",
                round,
                outcome.final_clusters.len()
            ));
        }
        info!(
            "Greedy merge finished after {} rounds with {} clusters ({} flushed)",
            round,
            outcome.final_clusters.len(),
            outcome.flushed
        );

        outcome
    }

    /// Qualifying neighbors of every cluster, best first.
    ///
    /// Each unordered pair is scored once. Observation happens after the
    /// fan-in, in `(i, j), i < j` order.
    pub fn similarity_pass(&self, clusters: &[Cluster]) -> Vec<Vec<Neighbor>> {
        let score_row = |i: usize| -> Vec<(usize, f64)> {
            ((i + 1)..clusters.len())
                .map(|j| (j, cluster_similarity(&clusters[i], &clusters[j])))
                .filter(|&(_, similarity)| similarity != 0.0 || similarity >= self.min_similarity)
                .collect()
        };

        let rows: Vec<Vec<(usize, f64)>> = if self.parallel {
            (0..clusters.len()).into_par_iter().map(score_row).collect()
        } else {
            (0..clusters.len()).map(score_row).collect()
        };

        if self.sinks.has_next_rounds() {
            for row in &rows {
                for &(_, similarity) in row {
                    self.sinks.observe_next_rounds(similarity);
                }
            }
        }

        // Filling rows in ascending i keeps every list in ascending id order
        // before the stable sort, so equal scores favor the lower id.
        let mut neighbors: Vec<Vec<Neighbor>> = vec![Vec::new(); clusters.len()];
        for (i, row) in rows.into_iter().enumerate() {
            for (j, similarity) in row {
                if similarity >= self.min_similarity {
                    neighbors[i].push(Neighbor { id: j, similarity });
                    neighbors[j].push(Neighbor { id: i, similarity });
                }
            }
        }
        for list in neighbors.iter_mut() {
            list.sort_by_key(|neighbor| neighbor.id);
            list.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        }

        neighbors
    }
}

/// Merges every scheduled pair into a fresh cluster and returns the next
/// round's arena.
pub fn merge_pairs(clusters: &[Cluster], pairs: &[(usize, usize)]) -> Vec<Cluster> {
    let merged = pairs
        .iter()
        .enumerate()
        .map(|(new_id, &(left, right))| clusters[left].merge(&clusters[right], new_id))
        .collect();
    order_by_size(merged)
}
