//! Run configuration shared by every differ

use crate::error::CompareResult;
use crate::filter::IdFilter;
use crate::report::Severity;
use hapi_config::{DurationSpec, Profile};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How strictly the candidate must match the baseline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Backward-compatible differences are warnings
    #[default]
    Update,
    /// Every difference is an error
    Exact,
}

impl Mode {
    /// Severity of a difference that is tolerable in an update
    pub fn compat_severity(self) -> Severity {
        match self {
            Mode::Update => Severity::Warning,
            Mode::Exact => Severity::Error,
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "update" => Ok(Mode::Update),
            "exact" => Ok(Mode::Exact),
            other => Err(format!("unknown mode '{}' (expected 'update' or 'exact')", other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Update => write!(f, "update"),
            Mode::Exact => write!(f, "exact"),
        }
    }
}

/// Which of the two servers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The original server (`s1`)
    Baseline,
    /// The updated server (`s2`)
    Candidate,
}

/// One of the two servers under comparison
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSpec {
    /// Short label used in every message (e.g. `nl`)
    pub label: String,
    /// Base URL, or a path to a JSON catalog dump
    pub url: String,
    /// Info keys ignored on this side
    pub omits: Vec<String>,
    /// Response cache lifetime; `None` allows reusing the catalog snapshot
    pub expire_after: Option<DurationSpec>,
}

impl ServerSpec {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into().trim_end_matches('/').to_string(),
            omits: Vec::new(),
            expire_after: None,
        }
    }

    pub fn with_omits<I, S>(mut self, omits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omits = omits.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_expire_after(mut self, expire_after: Option<DurationSpec>) -> Self {
        self.expire_after = expire_after;
        self
    }

    /// True when `url` names a local catalog dump rather than a server
    pub fn is_local(&self) -> bool {
        !self.url.starts_with("http")
    }
}

/// Command-line choices that complete a [`Profile`]
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub mode: Mode,
    pub id_pattern: Option<String>,
    pub warn: bool,
    pub compare_data: bool,
    pub parallel: bool,
    pub data_dir: PathBuf,
}

/// Immutable configuration of one comparison run
#[derive(Debug, Clone)]
pub struct ComparisonContext {
    baseline: ServerSpec,
    candidate: ServerSpec,
    baseline_padded: String,
    candidate_padded: String,
    mode: Mode,
    filter: IdFilter,
    warn: bool,
    compare_data: bool,
    parallel: bool,
    sample_duration: chrono::Duration,
    data_dir: PathBuf,
}

impl ComparisonContext {
    /// Create a context with default options (`update` mode, metadata only)
    pub fn new(baseline: ServerSpec, candidate: ServerSpec) -> Self {
        let width = baseline.label.len().max(candidate.label.len());
        let baseline_padded = format!("{:<width$}", baseline.label);
        let candidate_padded = format!("{:<width$}", candidate.label);

        Self {
            baseline,
            candidate,
            baseline_padded,
            candidate_padded,
            mode: Mode::default(),
            filter: IdFilter::default(),
            warn: false,
            compare_data: false,
            parallel: false,
            sample_duration: chrono::Duration::hours(1),
            data_dir: PathBuf::from("data"),
        }
    }

    /// Build the context for a profile and the command-line options
    pub fn from_profile(profile: &Profile, options: &RunOptions) -> CompareResult<Self> {
        profile.validate(options.compare_data)?;

        let baseline = ServerSpec::new(&profile.s1, &profile.url1)
            .with_omits(profile.s1_omits.iter().cloned())
            .with_expire_after(profile.s1_expire_after);
        let candidate = ServerSpec::new(&profile.s2, &profile.url2)
            .with_omits(profile.s2_omits.iter().cloned())
            .with_expire_after(profile.s2_expire_after);

        Ok(Self::new(baseline, candidate)
            .with_mode(options.mode)
            .with_filter(IdFilter::new(options.id_pattern.as_deref())?)
            .with_warn(options.warn)
            .with_compare_data(options.compare_data)
            .with_parallel(options.parallel)
            .with_sample_duration(profile.sample_duration.to_duration())
            .with_data_dir(options.data_dir.clone()))
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_filter(mut self, filter: IdFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_warn(mut self, warn: bool) -> Self {
        self.warn = warn;
        self
    }

    pub fn with_compare_data(mut self, compare_data: bool) -> Self {
        self.compare_data = compare_data;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_sample_duration(mut self, sample_duration: chrono::Duration) -> Self {
        self.sample_duration = sample_duration;
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn server(&self, side: Side) -> &ServerSpec {
        match side {
            Side::Baseline => &self.baseline,
            Side::Candidate => &self.candidate,
        }
    }

    pub fn baseline(&self) -> &ServerSpec {
        &self.baseline
    }

    pub fn candidate(&self) -> &ServerSpec {
        &self.candidate
    }

    /// Label of one side
    pub fn label(&self, side: Side) -> &str {
        &self.server(side).label
    }

    /// Label of one side, right-padded so both labels have the same width
    pub fn padded(&self, side: Side) -> &str {
        match side {
            Side::Baseline => &self.baseline_padded,
            Side::Candidate => &self.candidate_padded,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn filter(&self) -> &IdFilter {
        &self.filter
    }

    /// Report differences that are only warnings in `update` mode
    pub fn warn(&self) -> bool {
        self.warn
    }

    pub fn compare_data(&self) -> bool {
        self.compare_data
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub fn sample_duration(&self) -> chrono::Duration {
        self.sample_duration
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_labels() {
        let ctx = ComparisonContext::new(
            ServerSpec::new("nl", "https://a.example/hapi"),
            ServerSpec::new("jf-new", "https://b.example/hapi"),
        );
        assert_eq!(ctx.padded(Side::Baseline), "nl    ");
        assert_eq!(ctx.padded(Side::Candidate), "jf-new");
        assert_eq!(ctx.label(Side::Baseline), "nl");
    }

    #[test]
    fn test_mode_parse_and_severity() {
        assert_eq!("exact".parse::<Mode>().unwrap(), Mode::Exact);
        assert_eq!("Update".parse::<Mode>().unwrap(), Mode::Update);
        assert!("strict".parse::<Mode>().is_err());
        assert_eq!(Mode::Update.compat_severity(), Severity::Warning);
        assert_eq!(Mode::Exact.compat_severity(), Severity::Error);
    }

    #[test]
    fn test_server_spec_trims_slash_and_detects_local() {
        let remote = ServerSpec::new("a", "https://a.example/hapi/");
        assert_eq!(remote.url, "https://a.example/hapi");
        assert!(!remote.is_local());
        assert!(ServerSpec::new("b", "data/all-bw.json").is_local());
    }

    #[test]
    fn test_from_profile_rejects_bad_pattern() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "s1": "a", "s2": "b", "url1": "http://a", "url2": "http://b"
        }))
        .unwrap();
        let options = RunOptions {
            id_pattern: Some("(".to_string()),
            ..RunOptions::default()
        };
        assert!(ComparisonContext::from_profile(&profile, &options).is_err());
    }
}
