//! Value characteristics
//!
//! Auxiliary parser/formatter hints an expert derives from its current UI
//! selections (precision, calendar, unit, language). They are recomputed on
//! every change notification and compared against the last accepted set to
//! decide whether a re-parse is needed even when the raw text is unchanged.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Well-known characteristic keys
pub mod keys {
    pub const LANGUAGE: &str = "language";
    pub const UNIT: &str = "unit";
    pub const PRECISION: &str = "precision";
    pub const CALENDAR: &str = "calendar";
}

/// Ordered key → JSON map of parser options
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueCharacteristics(IndexMap<String, Json>);

impl ValueCharacteristics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Json>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Json>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Json> {
        self.0.get(key)
    }

    /// String value of a characteristic
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Json::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Json)> {
        self.0.iter()
    }

    /// Merge `other` into `self`; later keys win
    pub fn merge(&mut self, other: ValueCharacteristics) {
        self.0.extend(other.0);
    }

    /// Key-by-key comparison in both directions
    ///
    /// Returns true if any key is missing on either side or maps to a
    /// different value.
    pub fn differs_from(&self, other: &ValueCharacteristics) -> bool {
        self.0.iter().any(|(key, value)| other.get(key) != Some(value))
            || other.0.keys().any(|key| !self.contains_key(key))
    }
}

impl FromIterator<(String, Json)> for ValueCharacteristics {
    fn from_iter<I: IntoIterator<Item = (String, Json)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
