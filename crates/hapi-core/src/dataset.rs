//! Dataset records, info responses, and parameter objects

use crate::fields;
use crate::EXTENSION_PREFIX;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Check if a key is a vendor extension (`x_` prefix)
pub fn is_extension_key(key: &str) -> bool {
    key.starts_with(EXTENSION_PREFIX)
}

/// One entry of a `/catalog` response, with the `/info` response attached
///
/// `info` is `None` when the info request for this dataset failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    /// Other catalog members such as `title`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DatasetRecord {
    /// Create a record that has no info attached yet
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            info: None,
            extra: Map::new(),
        }
    }

    /// Attach an info response
    pub fn with_info(mut self, info: Info) -> Self {
        self.info = Some(info);
        self
    }
}

/// An `/info` response
///
/// The ordered parameter list is kept apart from the scalar members because
/// it is compared by its own rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Info {
    /// Build an info object from a JSON value
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Remove the response envelope members (`status`, `HAPI`)
    pub fn strip_envelope(&mut self) {
        self.fields.remove(fields::STATUS);
        self.fields.remove(fields::HAPI);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Scalar member names (everything except `parameters`)
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Parameter names in declaration order
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(Parameter::name).collect()
    }
}

/// One element of an info response's `parameters` list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameter {
    fields: Map<String, Value>,
}

impl Parameter {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build a parameter from a JSON object
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// The parameter name, or an empty string when the server omitted it
    pub fn name(&self) -> &str {
        self.fields
            .get(fields::NAME)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Declared HAPI data type (`int`, `double`, `string`, `isotime`)
    pub fn data_type(&self) -> Option<&str> {
        self.fields.get(fields::TYPE).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Number of bin descriptors, `None` when the parameter has no `bins`
    pub fn bins_count(&self) -> Option<usize> {
        match self.fields.get(fields::BINS)? {
            Value::Array(bins) => Some(bins.len()),
            Value::Null => Some(0),
            _ => Some(1),
        }
    }
}
