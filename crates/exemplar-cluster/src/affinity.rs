//! Similarity matrix construction.
//!
//! Turns feature vectors (or a caller-supplied matrix) into the n×n matrix S
//! consumed by the solver. Vector metrics are symmetric off the diagonal; the
//! diagonal holds a placeholder until the preference overwrites it.

use exemplar_core::{ExemplarError, Metric, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matrix::SquareMatrix;

/// Input to one clustering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterInput {
    /// One feature vector per item, compared under `metric`.
    Vectors { vectors: Vec<Vec<f64>>, metric: Metric },
    /// A ready-made n×n similarity matrix.
    Precomputed(Vec<Vec<f64>>),
}

impl ClusterInput {
    pub fn euclidean(vectors: Vec<Vec<f64>>) -> Self {
        Self::Vectors {
            vectors,
            metric: Metric::Euclidean,
        }
    }

    pub fn cosine(vectors: Vec<Vec<f64>>) -> Self {
        Self::Vectors {
            vectors,
            metric: Metric::Cosine,
        }
    }

    pub fn precomputed(matrix: Vec<Vec<f64>>) -> Self {
        Self::Precomputed(matrix)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        match self {
            Self::Vectors { vectors, .. } => vectors.len(),
            Self::Precomputed(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn metric(&self) -> Metric {
        match self {
            Self::Vectors { metric, .. } => *metric,
            Self::Precomputed(_) => Metric::Precomputed,
        }
    }

    /// Check shape and finiteness without allocating anything n×n.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Vectors { metric, .. } if !metric.needs_vectors() => {
                Err(ExemplarError::MissingMatrix)
            }
            Self::Vectors { vectors, .. } => {
                let expected = vectors.first().map_or(0, Vec::len);
                for (index, v) in vectors.iter().enumerate() {
                    if v.len() != expected {
                        return Err(ExemplarError::DimensionMismatch {
                            index,
                            expected,
                            found: v.len(),
                        });
                    }
                    check_finite(index, v)?;
                }
                Ok(())
            }
            Self::Precomputed(rows) => {
                let expected = rows.len();
                for (row, values) in rows.iter().enumerate() {
                    if values.len() != expected {
                        return Err(ExemplarError::NonSquareMatrix {
                            row,
                            expected,
                            found: values.len(),
                        });
                    }
                    check_finite(row, values)?;
                }
                Ok(())
            }
        }
    }
}

fn check_finite(row: usize, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(col) => Err(ExemplarError::NonFinite { row, col }),
        None => Ok(()),
    }
}

/// Build the similarity matrix S for a validated input.
pub fn similarity_matrix(input: &ClusterInput) -> Result<SquareMatrix> {
    input.validate()?;
    let s = match input {
        ClusterInput::Vectors { vectors, metric } => match metric {
            Metric::Euclidean => euclidean(vectors),
            Metric::Cosine => cosine(vectors),
            Metric::Precomputed => return Err(ExemplarError::MissingMatrix),
        },
        ClusterInput::Precomputed(rows) => SquareMatrix::from_rows(rows),
    };
    // Finite coordinates can still overflow once squared or multiplied.
    if let Some(pos) = s.as_slice().iter().position(|v| !v.is_finite()) {
        return Err(ExemplarError::NonFinite {
            row: pos / s.n(),
            col: pos % s.n(),
        });
    }
    debug!(n = s.n(), metric = %input.metric(), "Similarity matrix built");
    Ok(s)
}

/// `S[i][j] = -‖x_i − x_j‖²`, diagonal 0.
fn euclidean(vectors: &[Vec<f64>]) -> SquareMatrix {
    let n = vectors.len();
    let mut s = SquareMatrix::zeros(n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d: f64 = vectors[i]
                .iter()
                .zip(&vectors[j])
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            s[(i, j)] = -d;
            s[(j, i)] = -d;
        }
    }
    s
}

/// `S[i][j] = cos(x_i, x_j)`, diagonal 1. Pairs involving a zero vector score 0.
fn cosine(vectors: &[Vec<f64>]) -> SquareMatrix {
    let n = vectors.len();
    let norms: Vec<f64> = vectors
        .iter()
        .map(|v| v.iter().map(|x| x * x).sum::<f64>().sqrt())
        .collect();
    let mut s = SquareMatrix::zeros(n);
    s.fill_diagonal(1.0);
    for i in 0..n {
        for j in (i + 1)..n {
            let denom = norms[i] * norms[j];
            let sim = if denom == 0.0 {
                0.0
            } else {
                let dot: f64 = vectors[i].iter().zip(&vectors[j]).map(|(a, b)| a * b).sum();
                dot / denom
            };
            s[(i, j)] = sim;
            s[(j, i)] = sim;
        }
    }
    s
}
