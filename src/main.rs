//! # NRC Exporter Entry Point
//!
//! Converts Nike Run Club activity JSON documents (as saved from the NRC
//! activity API) into GPX files. Inputs, output directory and conversion
//! policies come from nrc-export.toml; command-line flags override it.


use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use nrc_export_lib::align::PairingPolicy;
use nrc_export_lib::batch::{self, BatchOptions};
use nrc_export_lib::config::{Config, CONFIG_FILE};
use nrc_export_lib::extract::DuplicatePolicy;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert Nike Run Club activities to GPX", long_about = None)]
struct Args {
    /// Activity JSON files or directories containing them
    #[arg(short, long = "input", num_args = 1.., value_hint = ValueHint::AnyPath)]
    inputs: Vec<PathBuf>,

    /// Directory receiving the GPX files
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    output: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Which stream wins when a metric type repeats: first, last or reject
    #[arg(long)]
    duplicates: Option<DuplicatePolicy>,

    /// How latitude and longitude are paired: merge, strict or positional
    #[arg(long)]
    pairing: Option<PairingPolicy>,

    /// Only convert GPS-recorded runs
    #[arg(long, action = ArgAction::SetTrue)]
    runs_only: bool,

    /// Write the effective configuration to this path and exit
    #[arg(long, value_hint = ValueHint::FilePath)]
    write_config: Option<PathBuf>,

    /// Print verbose output
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

impl Args {
    /// Layer command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut Config) {
        if !self.inputs.is_empty() {
            config.input.paths = self.inputs.clone();
        }
        if let Some(output) = &self.output {
            config.output.directory = output.clone();
        }
        if let Some(policy) = self.duplicates {
            config.conversion.duplicate_policy = policy;
        }
        if let Some(policy) = self.pairing {
            config.conversion.pairing_policy = policy;
        }
        if self.runs_only {
            config.input.runs_only = true;
        }
    }
}

/// Main application entry point.
fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut config = match &args.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    args.apply(&mut config);

    if let Some(path) = &args.write_config {
        if let Err(e) = config.save_to_path(path) {
            bail!("failed to write {}: {e}", path.display());
        }
        return Ok(());
    }

    info!("starting NRC exporter");
    let options = BatchOptions {
        convert: config.convert_options(),
        runs_only: config.input.runs_only,
    };
    let report = batch::run(&config.input.paths, &config.output.directory, &options)
        .with_context(|| {
            format!(
                "converting {:?} into {} (see {CONFIG_FILE})",
                config.input.paths,
                config.output.directory.display()
            )
        })?;

    info!(
        "parsed {} activities successfully out of {} total",
        report.converted, report.total
    );
    Ok(())
}
