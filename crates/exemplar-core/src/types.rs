use serde::{Deserialize, Serialize};

use crate::error::{ExemplarError, Result};

/// Pairwise affinity metric used to build the similarity matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Negative squared Euclidean distance.
    #[default]
    Euclidean,
    /// Cosine similarity; zero-norm pairs score 0.
    Cosine,
    /// Caller-supplied n×n matrix, used verbatim.
    Precomputed,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::Cosine => "cosine",
            Self::Precomputed => "precomputed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "euclidean" => Some(Self::Euclidean),
            "cosine" => Some(Self::Cosine),
            "precomputed" => Some(Self::Precomputed),
            _ => None,
        }
    }

    /// Whether this metric derives similarities from feature vectors.
    pub fn needs_vectors(&self) -> bool {
        !matches!(self, Self::Precomputed)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tuning parameters for one affinity propagation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterParams {
    /// Weight given to the previous message value, in [0.5, 1.0).
    pub damping: f64,
    /// Iteration budget.
    pub max_iterations: usize,
    /// Consecutive iterations with an unchanged exemplar set required to stop.
    pub convergence_window: usize,
    /// Diagonal self-similarity. `None` selects the median of the matrix.
    pub preference: Option<f64>,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            damping: 0.5,
            max_iterations: 200,
            convergence_window: 15,
            preference: None,
        }
    }
}

impl ClusterParams {
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_convergence_window(mut self, convergence_window: usize) -> Self {
        self.convergence_window = convergence_window;
        self
    }

    pub fn with_preference(mut self, preference: f64) -> Self {
        self.preference = Some(preference);
        self
    }

    /// Check every parameter, failing on the first invalid one.
    pub fn validate(&self) -> Result<()> {
        // NaN fails both comparisons.
        if !(self.damping >= 0.5 && self.damping < 1.0) {
            return Err(ExemplarError::InvalidDamping(self.damping));
        }
        if self.max_iterations == 0 {
            return Err(ExemplarError::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.convergence_window == 0 {
            return Err(ExemplarError::InvalidParameter(
                "convergence_window must be at least 1".to_string(),
            ));
        }
        if let Some(p) = self.preference {
            if !p.is_finite() {
                return Err(ExemplarError::InvalidParameter(format!(
                    "preference must be finite, got {p}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Metric ──────────────────────────────────────────────────────

    #[test]
    fn test_metric_parse_as_str_roundtrip() {
        for m in [Metric::Euclidean, Metric::Cosine, Metric::Precomputed] {
            assert_eq!(Metric::parse(m.as_str()), Some(m));
        }
    }

    #[test]
    fn test_metric_parse_unknown_returns_none() {
        assert_eq!(Metric::parse("manhattan"), None);
        assert_eq!(Metric::parse(""), None);
        assert_eq!(Metric::parse("Cosine"), None); // case-sensitive
    }

    #[test]
    fn test_metric_serde_snake_case() {
        let json = serde_json::to_string(&Metric::Precomputed).unwrap();
        assert_eq!(json, r#""precomputed""#);
        let back: Metric = serde_json::from_str(r#""cosine""#).unwrap();
        assert_eq!(back, Metric::Cosine);
    }

    #[test]
    fn test_metric_needs_vectors() {
        assert!(Metric::Euclidean.needs_vectors());
        assert!(Metric::Cosine.needs_vectors());
        assert!(!Metric::Precomputed.needs_vectors());
    }

    // ── ClusterParams ───────────────────────────────────────────────

    #[test]
    fn test_params_defaults() {
        let p = ClusterParams::default();
        assert_eq!(p.damping, 0.5);
        assert_eq!(p.max_iterations, 200);
        assert_eq!(p.convergence_window, 15);
        assert!(p.preference.is_none());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_params_damping_bounds() {
        let low = ClusterParams::default().with_damping(0.49);
        assert!(matches!(low.validate(), Err(ExemplarError::InvalidDamping(_))));

        let one = ClusterParams::default().with_damping(1.0);
        assert!(matches!(one.validate(), Err(ExemplarError::InvalidDamping(_))));

        let nan = ClusterParams::default().with_damping(f64::NAN);
        assert!(matches!(nan.validate(), Err(ExemplarError::InvalidDamping(_))));

        assert!(ClusterParams::default().with_damping(0.5).validate().is_ok());
        assert!(ClusterParams::default().with_damping(0.99).validate().is_ok());
    }

    #[test]
    fn test_params_zero_budgets_rejected() {
        let p = ClusterParams::default().with_max_iterations(0);
        assert!(matches!(p.validate(), Err(ExemplarError::InvalidParameter(_))));

        let p = ClusterParams::default().with_convergence_window(0);
        assert!(matches!(p.validate(), Err(ExemplarError::InvalidParameter(_))));
    }

    #[test]
    fn test_params_window_larger_than_budget_is_valid() {
        let p = ClusterParams::default()
            .with_max_iterations(5)
            .with_convergence_window(15);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_params_non_finite_preference_rejected() {
        let p = ClusterParams::default().with_preference(f64::INFINITY);
        assert!(matches!(p.validate(), Err(ExemplarError::InvalidParameter(_))));
        assert!(ClusterParams::default().with_preference(-50.0).validate().is_ok());
    }
}
