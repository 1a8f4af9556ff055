//! Command-line arguments

use clap::{Parser, ValueEnum};
use hapi_compare::config::{Mode, RunOptions};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Backward-compatible differences are warnings
    Update,
    /// Every difference is an error
    Exact,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Update => Mode::Update,
            ModeArg::Exact => Mode::Exact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Directive for `tracing_subscriber::EnvFilter`
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

/// Compare the catalog, info and data responses of two HAPI servers
#[derive(Debug, Parser)]
#[command(name = "hapi-compare", version)]
pub struct Cli {
    /// Pattern for dataset ids to include, e.g. '^A|^B' (default: all)
    #[arg(long)]
    pub id: Option<String>,

    /// (Deprecated) Same as --id
    #[arg(long)]
    pub include: Option<String>,

    /// 'update' reports backward-compatible differences as warnings
    #[arg(long, value_enum, default_value_t = ModeArg::Update)]
    pub mode: ModeArg,

    /// Profile to use from the configuration file
    #[arg(long, default_value = "CDAWeb")]
    pub conf: String,

    /// Profile file (JSON, or YAML when it ends in .yaml/.yml)
    #[arg(long, env = "HAPI_COMPARE_CONFIG", default_value = "compare.json")]
    pub config: PathBuf,

    /// Print warnings for differences that update mode tolerates
    #[arg(long)]
    pub warn: bool,

    /// Directory for logs and caches
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Request the two data samples concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Compare a data sample of every dataset
    #[arg(long)]
    pub compare_data: bool,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Same as --log-level debug
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Log level after applying `--debug`
    pub fn effective_log_level(&self) -> LogLevel {
        if self.debug {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }

    /// Dataset id pattern; `--include` overrides `--id`
    pub fn id_pattern(&self) -> Option<&str> {
        self.include.as_deref().or(self.id.as_deref())
    }

    pub fn run_options(&self, data_dir: PathBuf) -> RunOptions {
        RunOptions {
            mode: self.mode.into(),
            id_pattern: self.id_pattern().map(str::to_string),
            warn: self.warn,
            compare_data: self.compare_data,
            parallel: self.parallel,
            data_dir,
        }
    }
}
