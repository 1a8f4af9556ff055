//! Log sinks: console, a per-profile log file, and a per-profile error file

use crate::cli::LogLevel;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Paths of the full log and the error-only log of a profile
pub fn log_paths(data_dir: &Path, profile: &str) -> (PathBuf, PathBuf) {
    (
        data_dir.join(format!("compare.{}.log", profile)),
        data_dir.join(format!("compare.{}.error.log", profile)),
    )
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("failed to create log file {}", path.display()))
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides the level. File and line are shown on the console
/// at debug level.
pub fn init(level: LogLevel, data_dir: &Path, profile: &str) -> Result<()> {
    let (log_path, error_path) = log_paths(data_dir, profile);
    let log_file = create(&log_path)?;
    let error_file = create(&error_path)?;
    let debug = level == LogLevel::Debug;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .without_time()
                .with_target(true)
                .with_file(debug)
                .with_line_number(debug),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(error_file))
                .with_filter(LevelFilter::ERROR),
        )
        .try_init()
        .context("failed to install log subscriber")?;

    Ok(())
}
