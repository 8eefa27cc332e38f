//! Row-level cell values, used when building a dataset from records.

use serde::{Deserialize, Serialize};

use super::collections::FxHashMap;

/// A single cell: numbers for numeric columns, text for categorical ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// One observation keyed by column name.
pub type Record = FxHashMap<String, Value>;
