// src/utils/signature.rs

use sha2::{Digest, Sha256};

use crate::models::FinalCluster;

/// SHA-256 over the ordered id tuples of a result.
///
/// Two runs with the same input and parameters produce the same signature;
/// any change in membership or order changes it.
pub fn cluster_signature(clusters: &[FinalCluster]) -> String {
    let mut hasher = Sha256::new();
    for cluster in clusters {
        let line = cluster
            .members()
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        hasher.update(line.as_bytes());
        hasher.update(b";");
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_stable() {
        let clusters = vec![FinalCluster::from_ids(vec![0, 1]), FinalCluster::from_ids(vec![2, 3, 4])];
        assert_eq!(cluster_signature(&clusters), cluster_signature(&clusters.clone()));
        assert_eq!(cluster_signature(&clusters).len(), 64);
    }

    #[test]
    fn test_signature_depends_on_order_and_grouping() {
        let a = vec![FinalCluster::from_ids(vec![0, 1]), FinalCluster::from_ids(vec![2])];
        let b = vec![FinalCluster::from_ids(vec![2]), FinalCluster::from_ids(vec![0, 1])];
        let c = vec![FinalCluster::from_ids(vec![0]), FinalCluster::from_ids(vec![1, 2])];
        assert_ne!(cluster_signature(&a), cluster_signature(&b));
        assert_ne!(cluster_signature(&a), cluster_signature(&c));
    }

    #[test]
    fn test_empty_result_has_signature() {
        // SHA-256 of the empty input.
        assert_eq!(
            cluster_signature(&[]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
