//! Dataset id exclusion

use regex::Regex;

/// Datasets that are never compared
pub const ALWAYS_OMITTED: &[&str] = &["AIM_CIPS_SCI_3A"];

/// Decides which dataset ids take part in a comparison
#[derive(Debug, Clone, Default)]
pub struct IdFilter {
    pattern: Option<Regex>,
}

impl IdFilter {
    /// Create a filter; with a pattern, only ids it matches are kept
    pub fn new(pattern: Option<&str>) -> Result<Self, regex::Error> {
        let pattern = pattern.map(Regex::new).transpose()?;
        Ok(Self { pattern })
    }

    /// True when an include pattern was given
    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }

    /// Check if a dataset is excluded from all comparisons
    ///
    /// The pattern is searched for anywhere in the id, it is not anchored.
    pub fn should_omit(&self, id: &str) -> bool {
        if ALWAYS_OMITTED.contains(&id) {
            return true;
        }
        match &self.pattern {
            Some(pattern) => !pattern.is_match(id),
            None => false,
        }
    }
}
