//! Profile file loader
//!
//! JSON files are parsed as-is. YAML files additionally support:
//! - `!env_var VAR` - Environment variable substitution

use crate::error::{ConfigError, ConfigResult};
use crate::profile::Profiles;
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// Syntax of a profile file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFormat {
    Json,
    Yaml,
}

impl ProfileFormat {
    /// Pick the format from a file extension (JSON unless `.yaml`/`.yml`)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => ProfileFormat::Yaml,
            _ => ProfileFormat::Json,
        }
    }
}

/// Load all profiles from a file
pub fn load_profiles(path: impl AsRef<Path>) -> ConfigResult<Profiles> {
    let path = path.as_ref();
    debug!("Loading profiles: {:?}", path);

    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_profiles_str(&content, ProfileFormat::from_path(path), path)
}

/// Load profiles from a string; `source_path` is only used in error messages
pub fn load_profiles_str(
    content: &str,
    format: ProfileFormat,
    source_path: &Path,
) -> ConfigResult<Profiles> {
    match format {
        ProfileFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::ParseJson {
                path: source_path.to_path_buf(),
                source: e,
            })
        }
        ProfileFormat::Yaml => {
            let parse_err = |e: serde_yaml::Error| ConfigError::ParseYaml {
                path: source_path.to_path_buf(),
                source: e,
            };
            let value: Value = serde_yaml::from_str(content).map_err(parse_err)?;
            let value = process_value(value)?;
            serde_yaml::from_value(value).map_err(parse_err)
        }
    }
}

/// Resolve custom tags in a YAML value
fn process_value(value: Value) -> ConfigResult<Value> {
    match value {
        Value::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            trace!("Processing tag '{}' with value {:?}", tag, tagged.value);

            match tag.as_str() {
                "!env_var" => process_env_var(tagged.value),
                _ => Err(ConfigError::InvalidValue {
                    key: tag,
                    reason: "unsupported tag".to_string(),
                }),
            }
        }
        Value::Mapping(map) => {
            let mut result = serde_yaml::Mapping::new();
            for (k, v) in map {
                result.insert(process_value(k)?, process_value(v)?);
            }
            Ok(Value::Mapping(result))
        }
        Value::Sequence(seq) => {
            let result: ConfigResult<Vec<Value>> = seq.into_iter().map(process_value).collect();
            Ok(Value::Sequence(result?))
        }
        _ => Ok(value),
    }
}

/// Process !env_var tag
fn process_env_var(value: Value) -> ConfigResult<Value> {
    let var_name = match value {
        Value::String(s) => s,
        _ => {
            return Err(ConfigError::InvalidValue {
                key: "!env_var".to_string(),
                reason: "environment variable name must be a string".to_string(),
            })
        }
    };

    let env_value = std::env::var(&var_name).map_err(|_| ConfigError::EnvVarNotFound {
        var: var_name.clone(),
    })?;

    debug!("Substituted env var: {}", var_name);
    Ok(Value::String(env_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::DurationSpec;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_json_profiles() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "compare.json",
            r#"{
  "CDAWeb": {
    "s1": "nl", "url1": "https://cdaweb.gsfc.nasa.gov/hapi",
    "s2": "jf", "url2": "http://localhost:8999/CDAWeb/hapi",
    "s1_omits": ["resourceURL"],
    "s1_expire_after": {"days": 1},
    "s2_expire_after": null,
    "sample_duration": {"minutes": 30}
  },
  "CDAWeb-metadata": {
    "s1": "nl", "url1": "https://cdaweb.gsfc.nasa.gov/hapi",
    "s2": "bw", "url2": "data/all-bw.json",
    "metadata_only": true
  }
}"#,
        );

        let profiles = load_profiles(&path).unwrap();
        assert_eq!(profiles.len(), 2);

        let cdaweb = profiles.get("CDAWeb").unwrap();
        assert_eq!(cdaweb.s1_omits, vec!["resourceURL".to_string()]);
        assert_eq!(cdaweb.s1_expire_after, Some(DurationSpec::days(1)));
        assert_eq!(cdaweb.s2_expire_after, None);
        assert_eq!(cdaweb.sample_duration.total_seconds(), 1_800);

        let metadata = profiles.get("CDAWeb-metadata").unwrap();
        assert!(metadata.validate(true).is_err());
    }

    #[test]
    fn test_load_yaml_with_env_var() {
        let dir = TempDir::new().unwrap();
        std::env::set_var("TEST_HAPI_COMPARE_URL2", "http://localhost:8999/hapi");
        let path = write_file(
            dir.path(),
            "compare.yaml",
            "local:\n  s1: a\n  url1: http://localhost:8998/hapi\n  s2: b\n  url2: !env_var TEST_HAPI_COMPARE_URL2\n",
        );

        let profiles = load_profiles(&path).unwrap();
        assert_eq!(
            profiles.get("local").unwrap().url2,
            "http://localhost:8999/hapi"
        );

        std::env::remove_var("TEST_HAPI_COMPARE_URL2");
    }

    #[test]
    fn test_missing_env_var() {
        let result = load_profiles_str(
            "p:\n  s1: a\n  url1: x\n  s2: b\n  url2: !env_var TEST_HAPI_COMPARE_UNSET\n",
            ProfileFormat::Yaml,
            Path::new("inline.yaml"),
        );
        assert!(matches!(result, Err(ConfigError::EnvVarNotFound { .. })));
    }

    #[test]
    fn test_invalid_json() {
        let result = load_profiles_str("{", ProfileFormat::Json, Path::new("bad.json"));
        assert!(matches!(result, Err(ConfigError::ParseJson { .. })));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = load_profiles(dir.path().join("nope.json"));
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ProfileFormat::from_path(Path::new("compare.yml")),
            ProfileFormat::Yaml
        );
        assert_eq!(
            ProfileFormat::from_path(Path::new("compare.json")),
            ProfileFormat::Json
        );
    }
}
