pub mod first_round;
pub mod harvest;
pub mod output;
pub mod scheduler;
pub mod similarity;
pub mod tag_clustering;
pub mod tag_index;

pub use first_round::{FirstRoundClusterBuilder, FirstRoundOutcome};
pub use harvest::{DiversityFilter, HarvestFilter};
pub use output::OutputAssembler;
pub use scheduler::{claim_pass, ClaimPass, GreedyMergeScheduler, Neighbor, SchedulerOutcome};
pub use similarity::{
    channel_observer, cluster_similarity, record_similarity, SimilarityLog, SimilarityObserver, SimilaritySinks,
};
pub use tag_clustering::{cluster_records, run_tag_clustering, ClusteringResult};
pub use tag_index::{prepare_records, TagFrequencyIndex};
