use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::types::{ClusterParams, Metric};

/// Top-level configuration for the Exemplar binary.
///
/// Loaded from `~/.exemplar/config.toml` by default. Any missing section or
/// field takes its default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExemplarConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub affinity: AffinityConfig,
    #[serde(default)]
    pub solver: SolverConfig,
}

impl ExemplarConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ExemplarConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults only if
    /// the file does not exist.
    ///
    /// A file that exists but cannot be read, parsed, or validated is an
    /// error; invalid settings are never replaced with defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.solver.params().validate()
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Similarity matrix settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AffinityConfig {
    /// Metric: "euclidean", "cosine", or "precomputed".
    pub metric: Metric,
}

/// Message-passing solver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Damping factor in [0.5, 1.0).
    pub damping: f64,
    /// Maximum number of message-passing iterations.
    pub max_iterations: usize,
    /// Stable iterations required to declare convergence.
    pub convergence_window: usize,
    /// Explicit preference. Omit to use the median similarity.
    pub preference: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let params = ClusterParams::default();
        Self {
            damping: params.damping,
            max_iterations: params.max_iterations,
            convergence_window: params.convergence_window,
            preference: params.preference,
        }
    }
}

impl SolverConfig {
    pub fn params(&self) -> ClusterParams {
        ClusterParams {
            damping: self.damping,
            max_iterations: self.max_iterations,
            convergence_window: self.convergence_window,
            preference: self.preference,
        }
    }
}

impl From<&SolverConfig> for ClusterParams {
    fn from(config: &SolverConfig) -> Self {
        config.params()
    }
}
