//! HAPI server comparison
//!
//! Compares an original HAPI server against an updated one using a named
//! profile from the configuration file. Exits with status 1 when any
//! error-level difference was found.

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use hapi_compare::{ComparisonContext, Harness, Reporter};
use hapi_config::load_profiles;
use std::process::ExitCode;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    std::fs::create_dir_all(&cli.data_dir)
        .with_context(|| format!("failed to create {}", cli.data_dir.display()))?;
    let data_dir = cli
        .data_dir
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", cli.data_dir.display()))?;

    logging::init(cli.effective_log_level(), &data_dir, &cli.conf)?;
    info!("Logging output to {}", data_dir.display());
    info!("Cache directory: {}", data_dir.display());

    if cli.include.is_some() {
        warn!("--include is deprecated. Use --id");
    }

    let profiles = load_profiles(&cli.config)?;
    let profile = profiles.get(&cli.conf)?;
    let ctx = ComparisonContext::from_profile(profile, &cli.run_options(data_dir))?;

    let harness = Harness::new(ctx)?;
    let mut reporter = Reporter::new();
    harness.run(&mut reporter).await?;
    reporter.log_summary();

    if reporter.has_errors() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
