// src/utils/constants.rs

/// Minimum number of distinct records a cluster needs to survive the per-round harvest.
pub const DEFAULT_MIN_ELEMENTS_IN_CLUSTER: usize = 4;

/// Record-level threshold for first-round stars (compared with `>`).
pub const DEFAULT_MIN_SIMILARITY_FIRST_ROUND: f64 = 0.5;

/// Cluster-level threshold the batch driver historically ran with.
/// Not applied unless configured; the default falls back to the first-round value.
pub const SUGGESTED_MIN_SIMILARITY_NEXT_ROUNDS: f64 = 0.45;

pub const DEFAULT_TAGS_FIELD: &str = "tags";
