//! JSON input document read by the binary.
//!
//! Two shapes are accepted:
//! - `{ "items": [{ "label": "gpu", "vector": [0.1, 0.2] }, ...] }` for vector metrics
//! - `{ "labels": ["a", "b"], "matrix": [[0, 1], [1, 0]] }` for `precomputed`
//!
//! Labels are optional for the matrix form and default to the item index.

use serde::Deserialize;

use exemplar_cluster::ClusterInput;
use exemplar_core::{ExemplarError, Metric, Result};

/// One labelled embedding vector.
#[derive(Debug, Clone, Deserialize)]
pub struct InputItem {
    pub label: String,
    pub vector: Vec<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputDocument {
    #[serde(default)]
    pub items: Vec<InputItem>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub matrix: Option<Vec<Vec<f64>>>,
}

impl InputDocument {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Split into labels and engine input for `metric`.
    pub fn into_request(self, metric: Metric) -> Result<(Vec<String>, ClusterInput)> {
        match metric {
            Metric::Precomputed => {
                let matrix = self.matrix.ok_or(ExemplarError::MissingMatrix)?;
                let labels = self
                    .labels
                    .unwrap_or_else(|| (0..matrix.len()).map(|i| i.to_string()).collect());
                Ok((labels, ClusterInput::Precomputed(matrix)))
            }
            _ => {
                if self.items.is_empty() && self.matrix.is_some() {
                    return Err(ExemplarError::MissingVectors);
                }
                let (labels, vectors): (Vec<String>, Vec<Vec<f64>>) = self
                    .items
                    .into_iter()
                    .map(|item| (item.label, item.vector))
                    .unzip();
                Ok((labels, ClusterInput::Vectors { vectors, metric }))
            }
        }
    }
}
