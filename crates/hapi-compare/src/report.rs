//! Severity-tagged findings of a comparison run

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info, warn};

/// Log target of every finding
pub const TARGET: &str = "compare";

/// How much a difference matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Logged for visibility, never affects the outcome
    Info,
    /// Tolerated difference
    Warning,
    /// Compatibility break
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// One reported finding; `text` may span several lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub severity: Severity,
    pub text: String,
}

/// Append-only sink for the findings of one run
///
/// Every message is also written to the log at the matching level.
#[derive(Debug, Default)]
pub struct Reporter {
    messages: Vec<Message>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding
    pub fn emit(&mut self, severity: Severity, text: impl Into<String>) {
        let text = text.into();
        for line in text.lines() {
            match severity {
                Severity::Info => info!(target: TARGET, "{}", line),
                Severity::Warning => warn!(target: TARGET, "{}", line),
                Severity::Error => error!(target: TARGET, "{}", line),
            }
        }
        self.messages.push(Message { severity, text });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.emit(Severity::Info, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.emit(Severity::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.emit(Severity::Error, text);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages of exactly one severity
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(move |m| m.severity == severity)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.with_severity(severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Number of warnings and errors
    pub fn problem_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity >= Severity::Warning)
            .count()
    }

    /// Log a one-line tally of the run
    pub fn log_summary(&self) {
        let errors = self.count(Severity::Error);
        let warnings = self.count(Severity::Warning);
        if errors == 0 {
            info!(target: TARGET, "Comparison passed ({} warnings)", warnings);
        } else {
            error!(
                target: TARGET,
                "Comparison failed ({} errors, {} warnings)", errors, warnings
            );
        }
    }
}
