pub mod cluster;
pub mod records;
pub mod stats_models;

pub use cluster::{order_by_size, Cluster, ClusterElement, ClusterMember, FinalCluster};
pub use records::{EncodedRecord, SourceRecord, TaggedRecord};
pub use stats_models::{ClusteringStats, RoundStats};
