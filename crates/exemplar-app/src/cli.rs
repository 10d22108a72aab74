//! CLI argument definitions for the Exemplar binary.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use exemplar_core::config::ExemplarConfig;
use exemplar_core::Metric;

/// Exemplar — affinity propagation clustering for embedding vectors.
#[derive(Parser, Debug)]
#[command(name = "exemplar", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// JSON input document. Reads stdin when omitted or "-".
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Affinity metric (euclidean, cosine, precomputed).
    #[arg(short = 'm', long = "metric", value_parser = parse_metric)]
    pub metric: Option<Metric>,

    /// Damping factor in [0.5, 1.0).
    #[arg(long = "damping")]
    pub damping: Option<f64>,

    /// Maximum message-passing iterations.
    #[arg(long = "max-iterations")]
    pub max_iterations: Option<usize>,

    /// Stable iterations required to declare convergence.
    #[arg(long = "convergence-window")]
    pub convergence_window: Option<usize>,

    /// Explicit preference (defaults to the median similarity).
    #[arg(long = "preference", allow_negative_numbers = true)]
    pub preference: Option<f64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Pretty-print the JSON output.
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Write the effective configuration to this path and exit.
    #[arg(long = "write-config")]
    pub write_config: Option<PathBuf>,
}

fn parse_metric(s: &str) -> Result<Metric, String> {
    Metric::parse(s).ok_or_else(|| {
        format!("unknown metric '{s}', expected euclidean, cosine, or precomputed")
    })
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > EXEMPLAR_CONFIG env var > platform default (~/.exemplar/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("EXEMPLAR_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }

    /// Input path, or `None` for stdin.
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|p| p.as_os_str() != "-")
    }

    /// Overlay command-line values onto a loaded configuration.
    pub fn apply_overrides(&self, config: &mut ExemplarConfig) {
        if let Some(metric) = self.metric {
            config.affinity.metric = metric;
        }
        if let Some(damping) = self.damping {
            config.solver.damping = damping;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.solver.max_iterations = max_iterations;
        }
        if let Some(window) = self.convergence_window {
            config.solver.convergence_window = window;
        }
        if let Some(preference) = self.preference {
            config.solver.preference = Some(preference);
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".exemplar").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".exemplar").join("config.toml");
    }
    PathBuf::from("config.toml")
}
