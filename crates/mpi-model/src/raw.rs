#![deny(unsafe_code)]

use std::collections::BTreeMap;

use crate::SourceSystem;

/// A single source-native cell value.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum RawValue {
    Text(String),
    Null,
}

impl RawValue {
    /// Builds a value from reader output, treating blank cells as null.
    pub fn from_cell(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Self::Null
        } else {
            Self::Text(raw.to_string())
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            Self::Null => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.as_text().is_none_or(|value| value.trim().is_empty())
    }
}

/// One row as emitted by a source reader, keyed by source-native field names.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RawSourceRecord {
    pub source_system: SourceSystem,
    /// Zero-based position within the batch it was read from.
    pub ordinal: usize,
    pub fields: BTreeMap<String, RawValue>,
}

impl RawSourceRecord {
    pub fn new(source_system: SourceSystem, ordinal: usize) -> Self {
        Self {
            source_system,
            ordinal,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: RawValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: RawValue) {
        self.fields.insert(name.into(), value);
    }

    /// Returns `None` when the field is absent from the row entirely.
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(RawValue::as_text)
    }
}
