// src/clustering/first_round.rs

use indicatif::ProgressBar;
use log::debug;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};

use crate::clustering::similarity::{record_similarity, SimilaritySinks};
use crate::models::{order_by_size, Cluster, ClusterElement, EncodedRecord};

/// Result of the first round: deduplicated stars in scheduler order.
#[derive(Debug, Clone)]
pub struct FirstRoundOutcome {
    /// Unique stars, ascending by member count, ids `0..k`.
    pub clusters: Vec<Cluster>,
    pub stars_built: usize,
    pub duplicates_removed: usize,
}

/// Builds one "star" per eligible record: the anchor plus every record whose
/// record-level similarity strictly exceeds the first-round threshold.
pub struct FirstRoundClusterBuilder<'a> {
    min_similarity: f64,
    parallel: bool,
    sinks: &'a SimilaritySinks,
    progress: Option<ProgressBar>,
}

impl<'a> FirstRoundClusterBuilder<'a> {
    pub fn new(min_similarity: f64, sinks: &'a SimilaritySinks) -> Self {
        Self {
            min_similarity,
            parallel: true,
            sinks,
            progress: None,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_progress(mut self, progress: Option<ProgressBar>) -> Self {
        self.progress = progress;
        self
    }

    pub fn build(&self, records: &[EncodedRecord]) -> FirstRoundOutcome {
        // Non-zero scores per anchor, indexed by position in `records`.
        let scores: Vec<Vec<(usize, f64)>> = if self.parallel {
            (0..records.len())
                .into_par_iter()
                .map(|anchor| self.score_anchor(records, anchor))
                .collect()
        } else {
            (0..records.len())
                .map(|anchor| self.score_anchor(records, anchor))
                .collect()
        };

        // Observation happens after the fan-in so sample order never depends on scheduling.
        if self.sinks.has_first_round() {
            for row in &scores {
                for &(_, similarity) in row {
                    self.sinks.observe_first_round(similarity);
                }
            }
        }

        let stars_built = scores.len();
        let mut seen_keys: HashSet<Vec<usize>> = HashSet::with_capacity(stars_built);
        let mut unique = Vec::with_capacity(stars_built);

        for (anchor_position, row) in scores.into_iter().enumerate() {
            let star = self.build_star(records, anchor_position, row);
            let key: Vec<usize> = star
                .elements
                .iter()
                .map(|element| element.id)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            if seen_keys.insert(key) {
                unique.push(star);
            }
        }

        let duplicates_removed = stars_built - unique.len();
        debug!(
            "First round: {} stars built, {} exact duplicates removed",
            stars_built, duplicates_removed
        );

        FirstRoundOutcome {
            clusters: order_by_size(unique),
            stars_built,
            duplicates_removed,
        }
    }

    fn score_anchor(&self, records: &[EncodedRecord], anchor: usize) -> Vec<(usize, f64)> {
        let original = &records[anchor];
        let row = records
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != anchor)
            .filter_map(|(position, candidate)| {
                let similarity = record_similarity(original, candidate);
                (similarity != 0.0).then_some((position, similarity))
            })
            .collect();
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
        row
    }

    fn build_star(&self, records: &[EncodedRecord], anchor: usize, row: Vec<(usize, f64)>) -> Cluster {
        let mut matches: Vec<(usize, f64)> = row
            .into_iter()
            .filter(|&(_, similarity)| similarity > self.min_similarity)
            .collect();
        matches.sort_by(|a, b| a.1.total_cmp(&b.1));

        let original = &records[anchor];
        let mut elements = Vec::with_capacity(matches.len() + 1);
        elements.push(ClusterElement::anchor(original.id));
        let mut tag_union = original.tags.clone();

        for (position, similarity) in matches {
            let matched = &records[position];
            elements.push(ClusterElement::matched(matched.id, similarity));
            tag_union.extend(matched.tags.iter().cloned());
        }

        Cluster::new(original.id, elements, tag_union)
    }
}
