//! Content record model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::util::parse_timestamp;

/// An opaque content entry (a story or a datasource entry).
///
/// The sync engine only reads fields from records and moves them around; it
/// never edits them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Build a record from an arbitrary JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(Error::InvalidInput(format!(
                "expected a JSON object for a record, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Top-level field lookup
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The nested `content` payload, when present
    pub fn content(&self) -> Option<&Map<String, Value>> {
        self.0.get("content").and_then(Value::as_object)
    }

    /// Look up a dotted path inside the `content` payload
    pub fn content_field(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.content()?.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// The published timestamp; `None` for unpublished or unparsable values
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.get("published_at")
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
    }

    /// The content type this record belongs to (`content.component`)
    pub fn category(&self) -> Option<&str> {
        self.content()
            .and_then(|content| content.get("component"))
            .and_then(Value::as_str)
    }

    /// Whether this record belongs to the given category; `None` matches all
    pub fn in_category(&self, category: Option<&str>) -> bool {
        category.is_none_or(|category| self.category() == Some(category))
    }

    /// Return a copy with the values of two top-level fields exchanged
    #[must_use]
    pub fn with_swapped_fields(mut self, left: &str, right: &str) -> Self {
        let left_value = self.0.remove(left);
        let right_value = self.0.remove(right);
        if let Some(value) = right_value {
            self.0.insert(left.to_string(), value);
        }
        if let Some(value) = left_value {
            self.0.insert(right.to_string(), value);
        }
        self
    }

    /// Convert back into a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Field a record's identity key is read from (e.g. `full_slug`, `uuid`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityField(String);

impl IdentityField {
    pub fn new(field: impl Into<String>) -> Self {
        Self(field.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the identity key of a record.
    ///
    /// Strings and integers produce keys; anything else (missing, null, empty,
    /// nested) marks the record as malformed.
    pub fn key_for(&self, record: &Record) -> Option<String> {
        match record.get(&self.0)? {
            Value::String(value) if !value.trim().is_empty() => Some(value.clone()),
            Value::Number(value) if value.is_i64() || value.is_u64() => Some(value.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record paired with its identity key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedRecord {
    pub key: String,
    pub record: Record,
}

impl KeyedRecord {
    pub fn new(key: impl Into<String>, record: Record) -> Self {
        Self {
            key: key.into(),
            record,
        }
    }

    /// Key a record by the given identity field, if it has one
    pub fn identify(record: Record, identity: &IdentityField) -> Option<Self> {
        let key = identity.key_for(&record)?;
        Some(Self { key, record })
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
