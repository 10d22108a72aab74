//! Re-attaching caller labels (e.g. keyword text) to cluster members.

use exemplar_core::{ExemplarError, Result};
use serde::{Deserialize, Serialize};

use crate::affinity::ClusterInput;
use crate::engine::{AffinityPropagation, Clustering};

/// One cluster with its members' labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledCluster {
    /// Dense zero-based cluster id.
    pub id: usize,
    /// Label of the exemplar this cluster is keyed on.
    pub exemplar: String,
    /// Member labels in input order.
    pub members: Vec<String>,
}

/// Labelled view of a [`Clustering`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledClustering {
    /// Input labels, unchanged.
    pub items: Vec<String>,
    pub actual_cluster_count: usize,
    pub clusters: Vec<LabeledCluster>,
    pub iterations: usize,
    pub converged: bool,
    pub fallback: bool,
}

impl LabeledClustering {
    /// Attach `labels` (one per item, by index) to `clustering`.
    pub fn from_clustering(labels: &[String], clustering: &Clustering) -> Result<Self> {
        if labels.len() != clustering.len() {
            return Err(ExemplarError::InvalidParameter(format!(
                "expected {} labels, got {}",
                clustering.len(),
                labels.len()
            )));
        }
        let clusters = clustering
            .clusters
            .iter()
            .zip(&clustering.exemplars)
            .enumerate()
            .map(|(id, (members, &exemplar))| LabeledCluster {
                id,
                exemplar: labels[exemplar].clone(),
                members: members.iter().map(|&i| labels[i].clone()).collect(),
            })
            .collect::<Vec<_>>();
        Ok(Self {
            items: labels.to_vec(),
            actual_cluster_count: clusters.len(),
            clusters,
            iterations: clustering.iterations,
            converged: clustering.converged(),
            fallback: clustering.fallback,
        })
    }
}

impl AffinityPropagation {
    /// Cluster `input` and report members by label.
    ///
    /// The label count must match the item count; the check runs before any
    /// clustering work.
    pub fn cluster_labeled(
        &self,
        labels: &[String],
        input: &ClusterInput,
    ) -> Result<LabeledClustering> {
        if labels.len() != input.len() {
            return Err(ExemplarError::InvalidParameter(format!(
                "expected {} labels, got {}",
                input.len(),
                labels.len()
            )));
        }
        let clustering = self.fit(input)?;
        LabeledClustering::from_clustering(labels, &clustering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_labels_follow_cluster_members() {
        let engine = AffinityPropagation::default();
        let input = ClusterInput::euclidean(vec![
            vec![0.0, 0.0],
            vec![10.0, 10.0],
            vec![0.0, 1.0],
            vec![10.0, 11.0],
            vec![1.0, 0.0],
            vec![11.0, 10.0],
        ]);
        let words = labels(&["gpu", "pasta", "tpu", "pizza", "asic", "risotto"]);
        let result = engine.cluster_labeled(&words, &input).unwrap();

        assert_eq!(result.actual_cluster_count, 2);
        assert_eq!(result.clusters[0].id, 0);
        assert_eq!(result.clusters[0].members, labels(&["gpu", "tpu", "asic"]));
        assert_eq!(result.clusters[1].members, labels(&["pasta", "pizza", "risotto"]));
        assert_eq!(result.items, words);
    }

    #[test]
    fn test_label_count_mismatch_rejected() {
        let engine = AffinityPropagation::default();
        let input = ClusterInput::euclidean(vec![vec![0.0], vec![1.0]]);
        let err = engine.cluster_labeled(&labels(&["only one"]), &input).unwrap_err();
        assert!(matches!(err, ExemplarError::InvalidParameter(_)));
    }

    #[test]
    fn test_serializes_with_camel_case_count() {
        let engine = AffinityPropagation::default();
        let input = ClusterInput::euclidean(vec![vec![2.0, 2.0]]);
        let result = engine.cluster_labeled(&labels(&["solo"]), &input).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["actualClusterCount"], 1);
        assert_eq!(json["clusters"][0]["exemplar"], "solo");
        assert_eq!(json["clusters"][0]["members"][0], "solo");
    }

    #[test]
    fn test_empty_input_has_no_clusters() {
        let engine = AffinityPropagation::default();
        let result = engine
            .cluster_labeled(&[], &ClusterInput::cosine(vec![]))
            .unwrap();
        assert_eq!(result.actual_cluster_count, 0);
        assert!(result.clusters.is_empty());
    }
}
