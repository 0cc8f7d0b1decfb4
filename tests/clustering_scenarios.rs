use std::collections::HashSet;

use proptest::prelude::*;
use tag_clustering_lib::clustering::scheduler::GreedyMergeScheduler;
use tag_clustering_lib::clustering::similarity::{cluster_similarity, record_similarity, SimilarityLog, SimilaritySinks};
use tag_clustering_lib::clustering::tag_clustering::{cluster_records, run_tag_clustering, ClusteringResult};
use tag_clustering_lib::clustering::tag_index::prepare_records;
use tag_clustering_lib::models::{Cluster, ClusterElement, FinalCluster};
use tag_clustering_lib::utils::clustering_config::ClusteringConfig;
use tag_clustering_lib::utils::progress_bars::progress_config::ProgressConfig;

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

fn run(raw: &[Vec<String>], config: &ClusteringConfig) -> ClusteringResult<Vec<String>> {
    run_tag_clustering(raw, config, &SimilaritySinks::none(), None, None, &ProgressConfig::default())
        .expect("valid parameters")
}

fn member_ids(result: &ClusteringResult<Vec<String>>) -> Vec<Vec<usize>> {
    result
        .clusters
        .iter()
        .map(|cluster| cluster.iter().map(|m| m.source_row_number).collect())
        .collect()
}

#[test]
fn basic_merge_keeps_only_the_pair() {
    let raw = records(&[&["t1", "t2", "t3"], &["t1", "t2", "t4"], &["t1", "t5", "t6"]]);

    let result = run(&raw, &config(2, 0.5));

    assert_eq!(member_ids(&result), vec![vec![0, 1]]);
    assert_eq!(result.clusters[0][0].source_data, raw[0]);
    assert_eq!(result.clusters[0][1].source_data, raw[1]);
}

#[test]
fn contested_cluster_is_dropped_not_harvested() {
    let tags = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<HashSet<_>>();
    let star = |members: &[usize], values: &[&str]| {
        let mut elements = vec![ClusterElement::anchor(members[0])];
        elements.extend(members[1..].iter().map(|&m| ClusterElement::matched(m, 1.0)));
        Cluster::new(0, elements, tags(values))
    };
    // X-Y 0.75, Y-Z 0.5, X-Z 0.25: X and Z both want Y, Y wants X.
    let x = star(&[0, 1], &["a", "b", "c", "d"]);
    let y = star(&[2, 3], &["a", "b", "c", "e"]);
    let z = star(&[4, 5, 6], &["c", "e", "f", "g"]);
    let sinks = SimilaritySinks::none();

    for min_elements in [2, 10] {
        let outcome = GreedyMergeScheduler::new(0.5, min_elements, &sinks).run(vec![x.clone(), y.clone(), z.clone()]);

        assert_eq!(outcome.final_clusters, vec![FinalCluster::from_ids(vec![0, 1, 2, 3])]);
        assert_eq!(outcome.rounds[0].pairs_scheduled, 1);
        assert_eq!(outcome.rounds[0].forfeited, 1);
        for id in [4, 5, 6] {
            assert!(outcome.final_clusters.iter().all(|c| !c.contains(id)));
        }
    }
}

#[test]
fn final_flush_emits_cluster_below_minimum_size() {
    // Record 1 only has a unique tag; 0 and 2 tie at 0.5 so they only meet as clusters.
    let raw = records(&[&["a", "d"], &["b"], &["c", "d"]]);

    let result = run(&raw, &config(3, 0.5));

    assert_eq!(member_ids(&result), vec![vec![0, 2]]);
    assert!(result.clusters[0].len() < 3);
    assert_eq!(result.stats.flushed, 1);
    assert_eq!(result.stats.eligible_records, 2);
}

#[test]
fn output_clusters_may_share_a_record() {
    let raw = records(&[&["b", "d", "e"], &["a", "c", "e"], &["c"], &["b"], &["e"]]);

    let result = run(&raw, &config(2, 0.5));

    let clusters: HashSet<Vec<usize>> = member_ids(&result).into_iter().collect();
    let expected: HashSet<Vec<usize>> = [vec![1, 2, 4], vec![0, 3, 4]].into_iter().collect();
    assert_eq!(clusters, expected);
    let containing_four = result
        .final_clusters
        .iter()
        .filter(|c| c.contains(4))
        .count();
    assert_eq!(containing_four, 2);
}

#[test]
fn record_with_only_unique_tags_never_appears() {
    let raw = records(&[&["t1", "t2"], &["t1", "t2", "t3"], &["lonely", "alone"]]);

    let result = run(&raw, &config(1, 0.5));

    assert_eq!(result.stats.eligible_records, 2);
    assert!(result.final_clusters.iter().all(|c| !c.contains(2)));
    assert!(!result.final_clusters.is_empty());
}

#[test]
fn degenerate_inputs_yield_empty_output() {
    let empty: Vec<Vec<String>> = Vec::new();
    assert!(cluster_records(&empty, &config(1, 0.5)).expect("valid").is_empty());

    let unique = records(&[&["a"], &["b"]]);
    let result = run(&unique, &config(1, 0.5));
    assert!(result.clusters.is_empty());
    assert_eq!(result.stats.eligible_records, 0);
}

#[test]
fn repeated_runs_are_identical() {
    let raw = records(&[
        &["rust", "cli", "parser"],
        &["rust", "parser", "compiler"],
        &["go", "cli"],
        &["rust", "cli"],
        &["go", "compiler", "parser"],
        &["python", "cli", "parser"],
        &["python", "go"],
    ]);
    let config = config(2, 0.4);

    let first = run(&raw, &config);
    let second = run(&raw, &config);

    assert_eq!(first.final_clusters, second.final_clusters);
    assert_eq!(first.stats.signature, second.stats.signature);
    assert_ne!(first.stats.run_id, second.stats.run_id);
}

#[test]
fn parallel_and_sequential_runs_observe_the_same_samples() {
    let raw = records(&[
        &["a", "b", "c"],
        &["a", "b", "d"],
        &["c", "d", "e"],
        &["e", "f"],
        &["f", "a"],
        &["b", "e"],
    ]);
    let mut results = Vec::new();

    for parallel in [true, false] {
        let first = SimilarityLog::new();
        let next = SimilarityLog::new();
        let sinks = SimilaritySinks::new(Some(first.observer()), Some(next.observer()));
        let config = ClusteringConfig {
            parallel,
            ..config(1, 0.3)
        };
        let result = run_tag_clustering(&raw, &config, &sinks, None, None, &ProgressConfig::default())
            .expect("valid parameters");
        results.push((result.final_clusters, first.samples(), next.samples()));
    }

    assert_eq!(results[0], results[1]);
    assert!(!results[0].1.is_empty());
}

fn tag_sets() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(0u8..8, 1..5), 0..10).prop_map(|rows| {
        rows.into_iter()
            .map(|row| row.into_iter().map(|t| format!("t{}", t)).collect())
            .collect()
    })
}

proptest! {
    #[test]
    fn record_similarity_is_symmetric(raw in tag_sets()) {
        let (_, encoded) = prepare_records(&raw);
        for a in &encoded {
            for b in &encoded {
                prop_assert_eq!(record_similarity(a, b), record_similarity(b, a));
            }
        }
    }

    #[test]
    fn cluster_similarity_is_symmetric(
        left in prop::collection::hash_set(0u8..12, 1..8),
        right in prop::collection::hash_set(0u8..12, 1..8),
    ) {
        let cluster = |id: usize, tags: &HashSet<u8>| {
            Cluster::new(id, vec![ClusterElement::anchor(id)], tags.iter().map(|t| format!("t{}", t)).collect())
        };
        let a = cluster(0, &left);
        let b = cluster(1, &right);
        let forward = cluster_similarity(&a, &b);
        prop_assert_eq!(forward, cluster_similarity(&b, &a));
        prop_assert!((0.0..=1.0).contains(&forward));
    }

    #[test]
    fn clustering_is_deterministic(raw in tag_sets(), threshold in 0.1f64..0.9, min_elements in 1usize..4) {
        let config = config(min_elements, threshold);
        let first = run(&raw, &config);
        let second = run(&raw, &config);
        prop_assert_eq!(&first.final_clusters, &second.final_clusters);
        prop_assert_eq!(&first.stats.signature, &second.stats.signature);
    }

    #[test]
    fn output_is_sorted_and_harvest_respects_minimum(raw in tag_sets(), threshold in 0.1f64..0.9, min_elements in 1usize..4) {
        let result = run(&raw, &config(min_elements, threshold));
        prop_assert!(result.final_clusters.windows(2).all(|w| w[0].len() <= w[1].len()));
        if result.stats.flushed == 0 {
            prop_assert!(result.final_clusters.iter().all(|c| c.len() >= min_elements));
        }
        for cluster in &result.final_clusters {
            prop_assert!(cluster.members().windows(2).all(|w| w[0] < w[1]));
        }
    }
}
