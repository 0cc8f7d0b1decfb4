// src/clustering/similarity.rs

use std::fmt;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use crate::models::{Cluster, EncodedRecord};

/// Callable receiving one non-zero similarity sample per comparison.
///
/// Observers are purely for analysis (histograms, CSV dumps) and can never
/// change a clustering outcome.
pub type SimilarityObserver = Arc<dyn Fn(f64) + Send + Sync>;

/// Overlap coefficient between two records.
///
/// The numerator counts shared *retained* tag codes while the denominator is
/// the smaller *full* tag-set size, so rare tags dilute a match without ever
/// contributing to it.
pub fn record_similarity(a: &EncodedRecord, b: &EncodedRecord) -> f64 {
    let smaller_count = a.tags.len().min(b.tags.len());
    let common = a.encoded_tags.intersection(&b.encoded_tags).count();
    common as f64 / smaller_count as f64
}

/// Overlap coefficient between the accumulated tag unions of two clusters.
pub fn cluster_similarity(a: &Cluster, b: &Cluster) -> f64 {
    let (smaller, larger) = if a.tag_union.len() <= b.tag_union.len() {
        (&a.tag_union, &b.tag_union)
    } else {
        (&b.tag_union, &a.tag_union)
    };
    let common = smaller.iter().filter(|tag| larger.contains(*tag)).count();
    common as f64 / smaller.len() as f64
}

/// Optional observation hooks for the two comparison granularities.
///
/// The sampling rates differ: the first round scores every anchor against
/// every other record, so each record pair is seen twice (once per
/// direction). Scheduler rounds score the upper triangle only, so each
/// cluster pair is seen once per round. Zero scores are never sampled.
#[derive(Clone, Default)]
pub struct SimilaritySinks {
    /// Record-level samples, one per ordered pair with a non-zero score.
    pub first_round: Option<SimilarityObserver>,
    /// Cluster-level samples, one per unordered pair per round.
    pub next_rounds: Option<SimilarityObserver>,
}

impl SimilaritySinks {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(first_round: Option<SimilarityObserver>, next_rounds: Option<SimilarityObserver>) -> Self {
        Self {
            first_round,
            next_rounds,
        }
    }

    pub fn observe_first_round(&self, similarity: f64) {
        emit(self.first_round.as_ref(), similarity);
    }

    pub fn observe_next_rounds(&self, similarity: f64) {
        emit(self.next_rounds.as_ref(), similarity);
    }

    pub fn has_first_round(&self) -> bool {
        self.first_round.is_some()
    }

    pub fn has_next_rounds(&self) -> bool {
        self.next_rounds.is_some()
    }
}

impl fmt::Debug for SimilaritySinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimilaritySinks")
            .field("first_round", &self.first_round.is_some())
            .field("next_rounds", &self.next_rounds.is_some())
            .finish()
    }
}

fn emit(observer: Option<&SimilarityObserver>, similarity: f64) {
    if similarity == 0.0 {
        return;
    }
    if let Some(observer) = observer {
        observer(similarity);
    }
}

/// Thread-safe in-memory collector of similarity samples.
#[derive(Debug, Default)]
pub struct SimilarityLog {
    samples: Mutex<Vec<f64>>,
}

impl SimilarityLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns an observer appending into this log.
    pub fn observer(self: &Arc<Self>) -> SimilarityObserver {
        let log = Arc::clone(self);
        Arc::new(move |similarity: f64| log.push(similarity))
    }

    pub fn push(&self, similarity: f64) {
        let mut samples = self.samples.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        samples.push(similarity);
    }

    /// Snapshot of every sample recorded so far, in arrival order.
    pub fn samples(&self) -> Vec<f64> {
        self.samples
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.samples
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Adapts a channel sender into an observer; send errors (receiver gone) are ignored.
pub fn channel_observer(sender: Sender<f64>) -> SimilarityObserver {
    let sender = Mutex::new(sender);
    Arc::new(move |similarity: f64| {
        if let Ok(sender) = sender.lock() {
            let _ = sender.send(similarity);
        }
    })
}
