//! Exemplar Cluster crate - affinity propagation over dense similarity matrices.
//!
//! Pipeline for one call:
//! - Similarity matrix from feature vectors (euclidean, cosine) or a precomputed matrix
//! - Preference selection (explicit or median) written onto the diagonal
//! - Damped responsibility/availability message passing until the exemplar set is stable
//! - Assignment of every item to its most similar exemplar, with dense cluster ids
//! - Single-cluster fallback when no exemplar emerges
//!
//! The engine is pure and deterministic: no I/O, no randomness, no shared state.

pub mod affinity;
pub mod assign;
pub mod engine;
pub mod labeled;
pub mod matrix;
pub mod preference;
pub mod solver;

pub use affinity::{similarity_matrix, ClusterInput};
pub use assign::Assignment;
pub use engine::{AffinityPropagation, Clustering};
pub use labeled::{LabeledCluster, LabeledClustering};
pub use matrix::SquareMatrix;
pub use solver::{MessagePassing, SolveOutcome, SolveStatus, SolverState};

pub use exemplar_core::{ClusterParams, ExemplarError, Metric, Result};
