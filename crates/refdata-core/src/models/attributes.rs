//! Opaque attribute payload carried by a fact.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{RefdataError, RefdataResult};

/// Ordered map of attribute name to scalar value.
///
/// Key order is irrelevant to equality; the `BTreeMap` also gives a canonical
/// JSON encoding, so two equal payloads always store as identical text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, Value>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an iterator, rejecting nested objects and arrays.
    pub fn from_pairs<I, K>(pairs: I) -> RefdataResult<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (key, value) in pairs {
            let key = key.into();
            if !is_scalar(&value) {
                return Err(RefdataError::MalformedFact {
                    reason: format!("attribute {key:?} must be a scalar, got {value}"),
                });
            }
            map.insert(key, value);
        }
        Ok(Self(map))
    }

    /// Insert a scalar attribute, returning the builder for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> RefdataResult<Self> {
        let key = key.into();
        let value = value.into();
        if !is_scalar(&value) {
            return Err(RefdataError::MalformedFact {
                reason: format!("attribute {key:?} must be a scalar, got {value}"),
            });
        }
        self.0.insert(key, value);
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Canonical JSON encoding as persisted in the `attributes` column.
    pub fn to_json(&self) -> RefdataResult<String> {
        Ok(serde_json::to_string(&self.0)?)
    }

    pub fn from_json(raw: &str) -> RefdataResult<Self> {
        let map: BTreeMap<String, Value> = serde_json::from_str(raw)?;
        Ok(Self(map))
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}
