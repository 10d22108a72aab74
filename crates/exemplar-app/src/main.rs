//! Exemplar binary - command-line front end for the clustering engine.
//!
//! 1. Parse CLI arguments and load the TOML configuration (an invalid file is fatal)
//! 2. Install the tracing subscriber
//! 3. Read the JSON input document (file or stdin)
//! 4. Run affinity propagation and print the labelled clusters as JSON

mod cli;
mod input;

use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use exemplar_cluster::{AffinityPropagation, LabeledClustering};
use exemplar_core::config::{ExemplarConfig, GeneralConfig};
use exemplar_core::Result;

use cli::CliArgs;
use input::InputDocument;

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

fn read_input(args: &CliArgs) -> Result<String> {
    match args.input_path() {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Config file (or defaults when it is missing) with CLI overrides applied.
/// Invalid values from either source are an error, never replaced.
fn effective_config(args: &CliArgs, path: &Path) -> Result<ExemplarConfig> {
    let mut config = ExemplarConfig::load_or_default(path)?;
    args.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

fn run(args: &CliArgs, config: &ExemplarConfig) -> Result<LabeledClustering> {
    let engine = AffinityPropagation::new(config.solver.params())?;

    let document = InputDocument::from_json(&read_input(args)?)?;
    let (labels, input) = document.into_request(config.affinity.metric)?;
    tracing::info!(
        items = input.len(),
        metric = %config.affinity.metric,
        "Clustering input"
    );

    let result = engine.cluster_labeled(&labels, &input)?;
    tracing::info!(
        clusters = result.actual_cluster_count,
        iterations = result.iterations,
        converged = result.converged,
        fallback = result.fallback,
        "Clustering complete"
    );
    Ok(result)
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Config is read before tracing so its log level can apply; load
    // failures are reported once the subscriber is up.
    let config_file = args.resolve_config_path();
    let loaded = effective_config(&args, &config_file);
    let config_level = loaded
        .as_ref()
        .map_or_else(|_| GeneralConfig::default().log_level, |c| c.general.log_level.clone());

    init_tracing(&args.resolve_log_level(&config_level));
    tracing::debug!("Starting Exemplar v{}", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(
                path = %config_file.display(),
                error = %e,
                "Invalid configuration"
            );
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &args.write_config {
        return match config.save(path) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to write config");
                ExitCode::FAILURE
            }
        };
    }

    let result = match run(&args, &config) {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Clustering failed");
            return ExitCode::FAILURE;
        }
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    };
    match json {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize result");
            ExitCode::FAILURE
        }
    }
}
