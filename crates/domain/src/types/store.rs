//! Key-value snapshot types exchanged with the persistent store

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::errors::{Result, SnaptrackError};

/// A set of key → JSON value pairs read from or written to the store.
///
/// Reads are lenient: a missing, `null` or malformed value is reported as
/// absent so callers can fall back to safe defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreValues(BTreeMap<String, Value>);

impl StoreValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a serializable value.
    pub fn with<T: Serialize + ?Sized>(mut self, key: impl Into<String>, value: &T) -> Result<Self> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn insert<T: Serialize + ?Sized>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        let key = key.into();
        let json = serde_json::to_value(value).map_err(|err| {
            SnaptrackError::Internal(format!("failed to serialize store value '{key}': {err}"))
        })?;
        self.0.insert(key, json);
        Ok(())
    }

    pub fn insert_value(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Deserialize a value, treating missing, `null` and malformed data as
    /// absent.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(key, error = %err, "ignoring malformed store value");
                None
            }
        }
    }

    /// Deserialize a JSON array element by element, dropping malformed
    /// entries instead of discarding the whole list.
    pub fn get_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(Value::Array(items)) = self.get(key) else {
            return Vec::new();
        };

        items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item.clone()) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    warn!(key, index, error = %err, "skipping malformed list entry");
                    None
                }
            })
            .collect()
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// Integer read that also accepts floating point numbers, since browser
    /// storage writes timestamps as JS numbers.
    #[allow(clippy::cast_possible_truncation)]
    pub fn i64_or(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(Value::Number(number)) => number
                .as_i64()
                .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
                .unwrap_or(default),
            _ => default,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for StoreValues {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Value)> for StoreValues {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Notification emitted for every key whose value changed in a `set`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreChange {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}
