// src/clustering/output.rs

use crate::models::{ClusterMember, FinalCluster};

/// Orders final clusters by cardinality and resolves their ids back to the
/// untouched input records.
pub struct OutputAssembler<'a, R> {
    records: &'a [R],
}

impl<'a, R: Clone> OutputAssembler<'a, R> {
    pub fn new(records: &'a [R]) -> Self {
        Self { records }
    }

    /// Stable sort by member count; clusters of equal size keep discovery order.
    pub fn order(mut clusters: Vec<FinalCluster>) -> Vec<FinalCluster> {
        clusters.sort_by_key(FinalCluster::len);
        clusters
    }

    pub fn assemble(&self, clusters: &[FinalCluster]) -> Vec<Vec<ClusterMember<R>>> {
        clusters
            .iter()
            .map(|cluster| {
                cluster
                    .members()
                    .iter()
                    .filter_map(|&id| {
                        self.records.get(id).map(|record| ClusterMember {
                            source_data: record.clone(),
                            source_row_number: id,
                        })
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_stable_by_cardinality() {
        let clusters = vec![
            FinalCluster::from_ids(vec![4, 5, 6]),
            FinalCluster::from_ids(vec![2, 3]),
            FinalCluster::from_ids(vec![0, 1]),
        ];

        let ordered = OutputAssembler::<String>::order(clusters);

        assert_eq!(ordered[0].members(), &[2, 3]);
        assert_eq!(ordered[1].members(), &[0, 1]);
        assert_eq!(ordered[2].members(), &[4, 5, 6]);
    }

    #[test]
    fn test_assemble_resolves_original_rows() {
        let records = vec!["r0".to_string(), "r1".to_string(), "r2".to_string()];
        let assembler = OutputAssembler::new(&records);

        let output = assembler.assemble(&[FinalCluster::from_ids(vec![2, 0])]);

        assert_eq!(
            output,
            vec![vec![
                ClusterMember {
                    source_data: "r0".to_string(),
                    source_row_number: 0
                },
                ClusterMember {
                    source_data: "r2".to_string(),
                    source_row_number: 2
                },
            ]]
        );
    }
}
