//! Affinity propagation entry point.
//!
//! Runs the full pipeline for one input: similarity matrix, preference,
//! message passing, then assignment. Each call allocates its own S, R and A
//! and drops them before returning, so one engine can serve concurrent calls.

use exemplar_core::{ClusterParams, Metric, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::affinity::{similarity_matrix, ClusterInput};
use crate::assign::assign;
use crate::preference::apply_preference;
use crate::solver::{solve, SolveStatus};

/// Result of one clustering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clustering {
    /// Item indices per cluster, in cluster-id order. Members are ascending.
    pub clusters: Vec<Vec<usize>>,
    /// Exemplar item index per cluster.
    pub exemplars: Vec<usize>,
    /// Cluster id per item.
    pub labels: Vec<usize>,
    /// Message-passing iterations performed.
    pub iterations: usize,
    pub status: SolveStatus,
    /// Preference placed on the diagonal (0 for trivial runs).
    pub preference: f64,
    /// True when no exemplar emerged and every item was grouped together.
    pub fallback: bool,
}

impl Clustering {
    pub fn n_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// Number of items clustered.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }

    /// Zero items give zero clusters; one item is its own exemplar.
    fn trivial(n: usize) -> Self {
        let items: Vec<usize> = (0..n).collect();
        Self {
            clusters: if n == 0 { Vec::new() } else { vec![items.clone()] },
            exemplars: items,
            labels: vec![0; n],
            iterations: 0,
            status: SolveStatus::Trivial,
            preference: 0.0,
            fallback: false,
        }
    }
}

/// Exemplar-based clusterer.
///
/// ```
/// use exemplar_cluster::{AffinityPropagation, ClusterInput};
///
/// let engine = AffinityPropagation::default();
/// let input = ClusterInput::euclidean(vec![
///     vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0],
///     vec![10.0, 10.0], vec![10.0, 11.0], vec![11.0, 10.0],
/// ]);
/// let result = engine.fit(&input).unwrap();
/// assert_eq!(result.clusters, vec![vec![0, 1, 2], vec![3, 4, 5]]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AffinityPropagation {
    params: ClusterParams,
}

impl AffinityPropagation {
    /// Create an engine, rejecting invalid parameters up front.
    pub fn new(params: ClusterParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &ClusterParams {
        &self.params
    }

    /// Cluster `input`. Configuration errors are raised before any n×n
    /// allocation; non-convergence is reported through the status, not as
    /// an error.
    pub fn fit(&self, input: &ClusterInput) -> Result<Clustering> {
        input.validate()?;
        let n = input.len();
        if n <= 1 {
            debug!(n, "Trivial input, skipping message passing");
            return Ok(Clustering::trivial(n));
        }

        let mut s = similarity_matrix(input)?;
        let preference = apply_preference(&mut s, self.params.preference);
        let outcome = solve(&s, &self.params);
        let exemplars = outcome.exemplars();
        let assignment = assign(&s, &exemplars);

        debug!(
            n,
            clusters = assignment.clusters.len(),
            iterations = outcome.iterations,
            status = outcome.status.as_str(),
            fallback = assignment.fallback,
            "Affinity propagation finished"
        );

        Ok(Clustering {
            clusters: assignment.clusters,
            exemplars: assignment.exemplars,
            labels: assignment.labels,
            iterations: outcome.iterations,
            status: outcome.status,
            preference,
            fallback: assignment.fallback,
        })
    }

    pub fn fit_vectors(&self, vectors: Vec<Vec<f64>>, metric: Metric) -> Result<Clustering> {
        self.fit(&ClusterInput::Vectors { vectors, metric })
    }

    pub fn fit_precomputed(&self, matrix: Vec<Vec<f64>>) -> Result<Clustering> {
        self.fit(&ClusterInput::Precomputed(matrix))
    }
}
