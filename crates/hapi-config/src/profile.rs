//! Comparison profile definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ConfigError, ConfigResult};

/// A duration written as an object of named units, e.g. `{"days": 1}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DurationSpec {
    #[serde(default)]
    pub weeks: i64,
    #[serde(default)]
    pub days: i64,
    #[serde(default)]
    pub hours: i64,
    #[serde(default)]
    pub minutes: i64,
    #[serde(default)]
    pub seconds: i64,
}

impl DurationSpec {
    pub fn days(days: i64) -> Self {
        Self {
            days,
            ..Self::default()
        }
    }

    pub fn hours(hours: i64) -> Self {
        Self {
            hours,
            ..Self::default()
        }
    }

    /// Total length in seconds
    pub fn total_seconds(&self) -> i64 {
        self.seconds + 60 * (self.minutes + 60 * (self.hours + 24 * (self.days + 7 * self.weeks)))
    }

    pub fn to_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.total_seconds())
    }

    /// Convert to a `std::time::Duration`, rejecting negative lengths
    pub fn to_std(&self, key: &str) -> ConfigResult<std::time::Duration> {
        u64::try_from(self.total_seconds())
            .map(std::time::Duration::from_secs)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                reason: "duration must not be negative".to_string(),
            })
    }
}

fn default_sample_duration() -> DurationSpec {
    DurationSpec::hours(1)
}

/// One named comparison setup: a baseline server (`s1`) and a candidate (`s2`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Short label of the baseline server
    pub s1: String,
    /// Short label of the candidate server
    pub s2: String,
    /// Baseline base URL, or a path to a JSON catalog dump
    pub url1: String,
    /// Candidate base URL, or a path to a JSON catalog dump
    pub url2: String,

    /// Info keys ignored on the baseline side
    #[serde(default)]
    pub s1_omits: Vec<String>,
    /// Info keys ignored on the candidate side
    #[serde(default)]
    pub s2_omits: Vec<String>,

    /// Response cache lifetime for the baseline; `None` reuses the catalog snapshot
    #[serde(default)]
    pub s1_expire_after: Option<DurationSpec>,
    /// Response cache lifetime for the candidate; `None` reuses the catalog snapshot
    #[serde(default)]
    pub s2_expire_after: Option<DurationSpec>,

    /// Length of the derived data sample window
    #[serde(default = "default_sample_duration")]
    pub sample_duration: DurationSpec,

    /// The servers only expose metadata, so data cannot be compared
    #[serde(default)]
    pub metadata_only: bool,
}

impl Profile {
    /// Check the profile can run with the requested options
    pub fn validate(&self, compare_data: bool) -> ConfigResult<()> {
        if self.s1.is_empty() || self.s2.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: if self.s1.is_empty() { "s1" } else { "s2" }.to_string(),
                reason: "server label cannot be empty".to_string(),
            });
        }
        if self.s1 == self.s2 {
            return Err(ConfigError::ValidationFailed {
                message: format!("both servers are labelled '{}'", self.s1),
            });
        }
        if compare_data && self.metadata_only {
            return Err(ConfigError::ValidationFailed {
                message: "profile does not support comparing data".to_string(),
            });
        }
        if self.sample_duration.total_seconds() <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "sample_duration".to_string(),
                reason: "duration must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// All profiles of a profile file, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profiles(BTreeMap<String, Profile>);

impl Profiles {
    /// Look up a profile by name
    pub fn get(&self, name: &str) -> ConfigResult<&Profile> {
        self.0.get(name).ok_or_else(|| ConfigError::UnknownProfile {
            name: name.to_string(),
            available: self.names().collect::<Vec<_>>().join(", "),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, profile: Profile) {
        self.0.insert(name.into(), profile);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> Profile {
        serde_json::from_value(json!({
            "s1": "nl", "s2": "jf",
            "url1": "https://a.example/hapi", "url2": "https://b.example/hapi"
        }))
        .unwrap()
    }

    #[test]
    fn test_profile_defaults() {
        let p = profile();
        assert!(p.s1_omits.is_empty());
        assert_eq!(p.s1_expire_after, None);
        assert_eq!(p.sample_duration, DurationSpec::hours(1));
        assert!(!p.metadata_only);
    }

    #[test]
    fn test_duration_total() {
        let d: DurationSpec =
            serde_json::from_value(json!({"days": 1, "hours": 2, "seconds": 3})).unwrap();
        assert_eq!(d.total_seconds(), 86_400 + 7_200 + 3);
        assert_eq!(d.to_duration(), chrono::Duration::seconds(93_603));
    }

    #[test]
    fn test_duration_rejects_unknown_units() {
        let result: Result<DurationSpec, _> = serde_json::from_value(json!({"fortnights": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_duration_to_std() {
        let d = DurationSpec::days(-1);
        assert!(matches!(
            d.to_std("s1_expire_after"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_metadata_only() {
        let mut p = profile();
        p.metadata_only = true;
        assert!(p.validate(false).is_ok());
        assert!(matches!(
            p.validate(true),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_validate_same_labels() {
        let mut p = profile();
        p.s2 = p.s1.clone();
        assert!(p.validate(false).is_err());
    }

    #[test]
    fn test_unknown_profile_lists_names() {
        let mut profiles = Profiles::default();
        profiles.insert("CDAWeb", profile());
        let err = profiles.get("SSCWeb").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown profile 'SSCWeb' (available: CDAWeb)"
        );
    }
}
