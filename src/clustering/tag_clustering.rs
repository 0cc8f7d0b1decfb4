// src/clustering/tag_clustering.rs

use chrono::Utc;
use indicatif::MultiProgress;
use log::info;
use uuid::Uuid;

use crate::clustering::first_round::FirstRoundClusterBuilder;
use crate::clustering::harvest::HarvestFilter;
use crate::clustering::output::OutputAssembler;
use crate::clustering::scheduler::GreedyMergeScheduler;
use crate::clustering::similarity::SimilaritySinks;
use crate::clustering::tag_index::prepare_records;
use crate::error::Result;
use crate::models::{ClusterMember, ClusteringStats, FinalCluster, TaggedRecord};
use crate::utils::clustering_config::ClusteringConfig;
use crate::utils::progress_bars::logging::ClusteringLogger;
use crate::utils::progress_bars::progress_config::ProgressConfig;
use crate::utils::signature::cluster_signature;

/// Output of a full run.
#[derive(Debug, Clone)]
pub struct ClusteringResult<R> {
    /// Assembled clusters, ascending by member count.
    pub clusters: Vec<Vec<ClusterMember<R>>>,
    /// The same clusters as bare id tuples, in the same order.
    pub final_clusters: Vec<FinalCluster>,
    pub stats: ClusteringStats,
}

/// Clusters `records` with the default sinks and no harvest filter.
pub fn cluster_records<R: TaggedRecord + Clone>(
    records: &[R],
    config: &ClusteringConfig,
) -> Result<Vec<Vec<ClusterMember<R>>>> {
    let result = run_tag_clustering(
        records,
        config,
        &SimilaritySinks::none(),
        None,
        None,
        &ProgressConfig::default(),
    )?;
    Ok(result.clusters)
}

/// Full pipeline: tag index → first-round stars → greedy merge → output.
///
/// Fails only on invalid parameters; degenerate input (empty, or no tag shared
/// by two records) yields an empty result.
pub fn run_tag_clustering<R: TaggedRecord + Clone>(
    records: &[R],
    config: &ClusteringConfig,
    sinks: &SimilaritySinks,
    harvest_filter: Option<&dyn HarvestFilter>,
    multi_progress: Option<MultiProgress>,
    progress_config: &ProgressConfig,
) -> Result<ClusteringResult<R>> {
    config.validate()?;

    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let logger = ClusteringLogger::new(config.log_timing);
    logger.log_start(&run_id.to_string(), records.len());

    logger.log_phase("Preparing records", None);
    let (index, encoded) = prepare_records(records);
    logger.log_preparation(records.len(), encoded.len(), index.distinct_tags(), index.retained_tags());

    logger.log_phase(
        "First round",
        Some(&format!("threshold > {:.3}", config.min_similarity_first_round)),
    );
    let anchor_pb = progress_config.create_step_bar(
        multi_progress.as_ref(),
        encoded.len() as u64,
        "Building first-round stars...",
    );
    let first_round = FirstRoundClusterBuilder::new(config.min_similarity_first_round, sinks)
        .with_parallel(config.parallel)
        .with_progress(anchor_pb.clone())
        .build(&encoded);
    if let Some(pb) = &anchor_pb {
        pb.finish_with_message(format!("{} stars", first_round.clusters.len()));
    }
    logger.log_first_round(first_round.stars_built, first_round.duplicates_removed);

    logger.log_phase(
        "Greedy merge",
        Some(&format!("threshold >= {:.3}", config.next_round_threshold())),
    );
    let rounds_pb = progress_config.create_spinner(multi_progress.as_ref(), "Merging clusters...");
    let scheduled = GreedyMergeScheduler::new(
        config.next_round_threshold(),
        config.min_elements_in_cluster,
        sinks,
    )
    .with_parallel(config.parallel)
    .with_harvest_filter(harvest_filter)
    .with_progress(rounds_pb)
    .with_logger(Some(&logger))
    .run(first_round.clusters);

    let final_clusters = OutputAssembler::<R>::order(scheduled.final_clusters);
    let clusters = OutputAssembler::new(records).assemble(&final_clusters);
    let signature = cluster_signature(&final_clusters);

    let stats = ClusteringStats {
        run_id,
        started_at,
        records_in: records.len(),
        eligible_records: encoded.len(),
        retained_tags: index.retained_tags(),
        first_round_stars: first_round.stars_built,
        duplicate_stars_removed: first_round.duplicates_removed,
        rounds: scheduled.rounds,
        flushed: scheduled.flushed,
        total_clusters: final_clusters.len(),
        elapsed_secs: logger.elapsed().as_secs_f64(),
        signature,
    };
    logger.log_completion(stats.total_clusters, &stats.signature);
    info!(
        "Run {}: {} harvested, {} flushed, {} forfeited over {} rounds",
        stats.run_id,
        stats.harvested(),
        stats.flushed,
        stats.forfeited(),
        stats.rounds.len()
    );

    Ok(ClusteringResult {
        clusters,
        final_clusters,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::harvest::DiversityFilter;
    use crate::error::ClusteringError;
    use crate::models::SourceRecord;
    use serde_json::json;

    fn records(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|tags| tags.iter().map(|t| t.to_string()).collect())
            .collect()
    }

    fn config(min_elements: usize, threshold: f64) -> ClusteringConfig {
        ClusteringConfig {
            min_elements_in_cluster: min_elements,
            min_similarity_first_round: threshold,
            log_timing: false,
            ..ClusteringConfig::default()
        }
    }

    #[test]
    fn test_scenario_a_single_cluster() {
        let raw = records(&[&["t1", "t2", "t3"], &["t1", "t2", "t4"], &["t1", "t5", "t6"]]);

        let result = run_tag_clustering(
            &raw,
            &config(2, 0.5),
            &SimilaritySinks::none(),
            None,
            None,
            &ProgressConfig::default(),
        )
        .expect("valid parameters");

        assert_eq!(result.final_clusters, vec![FinalCluster::from_ids(vec![0, 1])]);
        assert_eq!(result.clusters[0][0].source_row_number, 0);
        assert_eq!(result.clusters[0][1].source_data, raw[1]);
        assert_eq!(result.stats.eligible_records, 3);
        assert_eq!(result.stats.retained_tags, 2);
        assert_eq!(result.stats.rounds.len(), 1);
        assert_eq!(result.stats.flushed, 0);
    }

    #[test]
    fn test_min_one_keeps_singleton() {
        let raw = records(&[&["t1", "t2", "t3"], &["t1", "t2", "t4"], &["t1", "t5", "t6"]]);

        let output = cluster_records(&raw, &config(1, 0.5)).expect("valid parameters");

        let rows: Vec<Vec<usize>> = output
            .iter()
            .map(|c| c.iter().map(|m| m.source_row_number).collect())
            .collect();
        assert_eq!(rows, vec![vec![2], vec![0, 1]]);
    }

    #[test]
    fn test_invalid_parameters_fail_before_clustering() {
        let raw = records(&[&["a"], &["a"]]);
        let err = cluster_records(&raw, &config(0, 0.5)).expect_err("min elements 0 is rejected");
        assert!(matches!(err, ClusteringError::InvalidParameter { .. }));
    }

    #[test]
    fn test_diversity_filter_rejects_single_source_cluster() {
        let make = |row: usize, tags: &[&str], country: &str| SourceRecord {
            row,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            facets: vec![country.to_string()],
            data: json!({ "row": row }),
        };
        let raw = vec![
            make(0, &["t1", "t2", "t3"], "pl"),
            make(1, &["t1", "t2", "t4"], "pl"),
            make(2, &["t1", "t5", "t6"], "de"),
        ];
        let filter = DiversityFilter::from_records(&raw, 2);

        let result = run_tag_clustering(
            &raw,
            &config(2, 0.5),
            &SimilaritySinks::none(),
            Some(&filter),
            None,
            &ProgressConfig::default(),
        )
        .expect("valid parameters");

        assert!(result.clusters.is_empty());
        assert_eq!(result.stats.rounds[0].discarded, 2);
    }
}
