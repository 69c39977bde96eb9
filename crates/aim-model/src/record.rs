use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// Raw submission as received from the FAST UI or an uploaded file.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Flat field-name to scalar-value record.
///
/// Used both for normalized FAST UI input and for mapped actuarial fields.
/// Keys are kept sorted so iteration, serialization and hashing are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Returns the value only when it is present and not missing.
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field).filter(|value| !value.is_missing())
    }

    pub fn has_value(&self, field: &str) -> bool {
        self.value(field).is_some()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.fields.remove(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, FieldValue);
    type IntoIter = btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Final sectioned output: section name to field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputRecord {
    sections: BTreeMap<String, BTreeMap<String, FieldValue>>,
}

impl OutputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a section even when it ends up holding no fields.
    pub fn add_section(&mut self, section: impl Into<String>) {
        self.sections.entry(section.into()).or_default();
    }

    pub fn insert(&mut self, section: &str, field: impl Into<String>, value: FieldValue) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(field.into(), value);
    }

    pub fn section(&self, section: &str) -> Option<&BTreeMap<String, FieldValue>> {
        self.sections.get(section)
    }

    pub fn get(&self, section: &str, field: &str) -> Option<&FieldValue> {
        self.sections.get(section)?.get(field)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Iterates `(section, field, value)` triples in sorted order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &FieldValue)> {
        self.sections.iter().flat_map(|(section, fields)| {
            fields
                .iter()
                .map(move |(field, value)| (section.as_str(), field.as_str(), value))
        })
    }

    pub fn field_count(&self) -> usize {
        self.sections.values().map(BTreeMap::len).sum()
    }
}
