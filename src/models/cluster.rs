// src/models/cluster.rs

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// One member of a round-local cluster.
///
/// The anchor of a first-round star carries no strength; every other member
/// carries the similarity score it joined with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClusterElement {
    pub id: usize,
    pub strength: Option<f64>,
}

impl ClusterElement {
    pub fn anchor(id: usize) -> Self {
        Self { id, strength: None }
    }

    pub fn matched(id: usize, strength: f64) -> Self {
        Self {
            id,
            strength: Some(strength),
        }
    }
}

/// A cluster as seen by a single scheduler round.
///
/// `id` is the cluster's position in the round's arena and is reassigned
/// every time the arena is re-sorted; record ids inside `elements` are the
/// only identifiers that survive across rounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub id: usize,
    pub elements: Vec<ClusterElement>,
    /// Union of the full (unfiltered) tag sets of every absorbed record.
    pub tag_union: HashSet<String>,
}

impl Cluster {
    pub fn new(id: usize, elements: Vec<ClusterElement>, tag_union: HashSet<String>) -> Self {
        Self {
            id,
            elements,
            tag_union,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Record ids with annotations stripped, deduplicated and ascending.
    pub fn member_ids(&self) -> Vec<usize> {
        self.elements
            .iter()
            .map(|element| element.id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Combines two clusters into a fresh one with the given id.
    ///
    /// Elements keep the left parent's order followed by the right parent's;
    /// a record id already present is skipped (first occurrence wins).
    pub fn merge(&self, other: &Cluster, id: usize) -> Cluster {
        let mut seen = HashSet::with_capacity(self.len() + other.len());
        let elements = self
            .elements
            .iter()
            .chain(other.elements.iter())
            .filter(|element| seen.insert(element.id))
            .copied()
            .collect();

        let tag_union = self.tag_union.union(&other.tag_union).cloned().collect();

        Cluster::new(id, elements, tag_union)
    }
}

/// Stable-sorts clusters ascending by element count and renumbers them
/// `0..k` in that order.
pub fn order_by_size(mut clusters: Vec<Cluster>) -> Vec<Cluster> {
    clusters.sort_by_key(|cluster| cluster.len());
    for (position, cluster) in clusters.iter_mut().enumerate() {
        cluster.id = position;
    }
    clusters
}

/// Terminal representation of a cluster: ascending, unique record ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FinalCluster(Vec<usize>);

impl FinalCluster {
    pub fn from_cluster(cluster: &Cluster) -> Self {
        Self(cluster.member_ids())
    }

    pub fn from_ids(ids: impl IntoIterator<Item = usize>) -> Self {
        Self(
            ids.into_iter()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        )
    }

    pub fn members(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: usize) -> bool {
        self.0.binary_search(&id).is_ok()
    }
}

/// One entry of an assembled output cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterMember<R> {
    pub source_data: R,
    pub source_row_number: usize,
}
