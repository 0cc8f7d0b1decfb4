// src/clustering/harvest.rs
//
// Two ways a cluster leaves the scheduler and becomes output:
// the per-round harvest (size filtered, optional harvest filter) and the
// final flush (unfiltered). They feed the same output collection but are
// kept as separate paths because their filtering differs.

use log::debug;
use std::collections::{BTreeSet, HashSet};

use crate::models::{Cluster, FinalCluster, TaggedRecord};

/// Extra acceptance rule applied by the per-round harvest after the size check.
pub trait HarvestFilter: Send + Sync {
    fn accept(&self, member_ids: &[usize]) -> bool;

    fn name(&self) -> &str {
        "custom"
    }
}

/// Requires the members of a cluster to span enough distinct facet values
/// (e.g. countries), so a cluster is not just one source repeated.
#[derive(Debug, Clone)]
pub struct DiversityFilter {
    facets_by_record: Vec<Vec<String>>,
    min_distinct: usize,
}

impl DiversityFilter {
    pub fn from_records<R: TaggedRecord>(records: &[R], min_distinct: usize) -> Self {
        Self {
            facets_by_record: records.iter().map(|r| r.facets().to_vec()).collect(),
            min_distinct,
        }
    }

    pub fn min_distinct(&self) -> usize {
        self.min_distinct
    }

    pub fn distinct_facets(&self, member_ids: &[usize]) -> usize {
        member_ids
            .iter()
            .filter_map(|&id| self.facets_by_record.get(id))
            .flatten()
            .map(String::as_str)
            .collect::<HashSet<_>>()
            .len()
    }
}

impl HarvestFilter for DiversityFilter {
    fn accept(&self, member_ids: &[usize]) -> bool {
        self.distinct_facets(member_ids) >= self.min_distinct
    }

    fn name(&self) -> &str {
        "diversity"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    pub harvested: usize,
    pub discarded: usize,
}

/// Per-round harvest of terminal-empty clusters.
///
/// Only clusters that were not claimed in the same pass are considered. A
/// cluster is emitted when its deduplicated member count reaches
/// `min_elements_in_cluster` (and the optional filter accepts it); otherwise
/// it is discarded for good.
pub fn harvest_terminal_clusters(
    clusters: &[Cluster],
    terminal_empty: &[usize],
    claimed: &[bool],
    min_elements_in_cluster: usize,
    filter: Option<&dyn HarvestFilter>,
    output: &mut Vec<FinalCluster>,
) -> HarvestSummary {
    let mut summary = HarvestSummary::default();

    // Ascending id order, like the claim pass itself.
    let candidates: BTreeSet<usize> = terminal_empty
        .iter()
        .copied()
        .filter(|&id| !claimed.get(id).copied().unwrap_or(false))
        .collect();

    for id in candidates {
        let final_cluster = FinalCluster::from_cluster(&clusters[id]);
        let big_enough = final_cluster.len() >= min_elements_in_cluster;
        let accepted = big_enough
            && filter.map_or(true, |f| f.accept(final_cluster.members()));

        if accepted {
            output.push(final_cluster);
            summary.harvested += 1;
        } else {
            debug!(
                "Discarding terminal cluster {} ({} members, size ok: {})",
                id,
                final_cluster.len(),
                big_enough
            );
            summary.discarded += 1;
        }
    }

    summary
}

/// Final flush: every cluster still active when the loop stops is appended
/// without any size filter, unless the same id tuple is already present.
///
/// Returns how many clusters were appended.
pub fn flush_remaining_clusters(clusters: &[Cluster], output: &mut Vec<FinalCluster>) -> usize {
    let mut present: HashSet<FinalCluster> = output.iter().cloned().collect();
    let mut appended = 0;

    for cluster in clusters {
        let final_cluster = FinalCluster::from_cluster(cluster);
        if present.insert(final_cluster.clone()) {
            output.push(final_cluster);
            appended += 1;
        }
    }

    appended
}
