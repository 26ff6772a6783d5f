//! Avatar Fit CLI
//!
//! Measurement JSON → rig parameters, catalog JSON → fit batch report.

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use avatar_core::{definitions, EngineConfig, GarmentCatalog};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "avatar-fit")]
#[command(about = "Compute avatar rig parameters and run garment fit batches", long_about = None)]
struct Cli {
    /// Engine config JSON (overrides AVATAR_ENGINE_CONFIG_PATH)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Map measurements to morph targets, bone scales and warnings
    Params {
        /// female | male
        #[arg(long)]
        gender: String,

        /// slim | standard | muscular
        #[arg(long)]
        preset: String,

        /// JSON object of measurement overrides, e.g. {"chest": 101}
        #[arg(long)]
        measurements: Option<PathBuf>,

        /// Single override, repeatable (e.g. --set waist=84)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
    },

    /// Fit the selected garments once and print tier and history
    Fit {
        /// Garment catalog JSON
        #[arg(long)]
        catalog: PathBuf,

        /// l0 | l1
        #[arg(long, default_value = "l0")]
        tier: String,

        /// Garment id, repeatable, fitted in order
        #[arg(long = "garment", required = true)]
        garments: Vec<String>,

        /// Also print body parameters (requires --preset)
        #[arg(long, requires = "preset")]
        gender: Option<String>,

        #[arg(long, requires = "gender")]
        preset: Option<String>,
    },

    /// Print the measurement definitions
    Definitions,

    /// Print the JSON Schema of the canonical garment catalog
    Schema,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::from_env()?,
    };

    let output = match cli.command {
        Commands::Params { gender, preset, measurements, overrides } => {
            let gender = fit_cli::parse_gender(&gender)?;
            let preset = fit_cli::parse_preset(&preset)?;
            let overrides = overrides
                .iter()
                .map(|raw| fit_cli::parse_assignment(raw))
                .collect::<Result<Vec<_>>>()?;

            let result = fit_cli::run_params(
                &config,
                gender,
                preset,
                measurements.as_deref(),
                &overrides,
            )?;
            for warning in &result.warnings {
                log::warn!("[params] {}", warning.message);
            }
            serde_json::to_value(&result)?
        }

        Commands::Fit { catalog, tier, garments, gender, preset } => {
            let tier = fit_cli::parse_tier(&tier)?;
            let body = match (gender, preset) {
                (Some(gender), Some(preset)) => {
                    Some((fit_cli::parse_gender(&gender)?, fit_cli::parse_preset(&preset)?))
                }
                _ => None,
            };

            let run = fit_cli::run_fit(&config, &catalog, tier, &garments, body)?;
            if run.report.downgraded() {
                log::warn!(
                    "[fit] L1 exceeded the {}ms budget, tier is now {}",
                    config.cost.latency_budget_ms,
                    run.tier
                );
            }
            serde_json::to_value(&run)?
        }

        Commands::Definitions => serde_json::to_value(definitions())?,

        Commands::Schema => GarmentCatalog::json_schema(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("avatar-fit CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
