//! Open key-value metadata attached to observations and alerts
//!
//! Metadata keys are strings; values are restricted to a small closed set
//! (string, number, bool, nested map). Anything else is rejected when the
//! map crosses into the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DashboardError, Result};

/// Metadata map with ordered keys
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Allowed metadata value kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Number(f64),
    String(String),
    Map(Metadata),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Number(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<Metadata> for MetadataValue {
    fn from(value: Metadata) -> Self {
        MetadataValue::Map(value)
    }
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Convert a JSON value, rejecting nulls, arrays and non-finite numbers
    pub fn try_from_json(path: &str, value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(MetadataValue::Bool(b)),
            Value::Number(n) => n
                .as_f64()
                .filter(|f| f.is_finite())
                .map(MetadataValue::Number)
                .ok_or_else(|| {
                    DashboardError::validation(format!("metadata '{}' is not a finite number", path))
                }),
            Value::String(s) => Ok(MetadataValue::String(s)),
            Value::Object(map) => {
                let mut nested = Metadata::new();
                for (key, value) in map {
                    let child_path = format!("{}.{}", path, key);
                    nested.insert(key, MetadataValue::try_from_json(&child_path, value)?);
                }
                Ok(MetadataValue::Map(nested))
            }
            Value::Null => Err(DashboardError::validation(format!(
                "metadata '{}' must not be null",
                path
            ))),
            Value::Array(_) => Err(DashboardError::validation(format!(
                "metadata '{}' must not be an array",
                path
            ))),
        }
    }
}

/// Parse caller-supplied JSON into a metadata map
///
/// `None` and `null` both yield an empty map; any other non-object is rejected.
pub fn metadata_from_json(value: Option<Value>) -> Result<Metadata> {
    match value {
        None | Some(Value::Null) => Ok(Metadata::new()),
        Some(Value::Object(map)) => {
            let mut metadata = Metadata::new();
            for (key, value) in map {
                let parsed = MetadataValue::try_from_json(&key, value)?;
                metadata.insert(key, parsed);
            }
            Ok(metadata)
        }
        Some(_) => Err(DashboardError::validation("metadata must be an object")),
    }
}
