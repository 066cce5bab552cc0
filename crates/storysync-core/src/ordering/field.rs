//! Typed field extraction for ordering

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::Record;
use crate::util::parse_timestamp;

/// Top-level fields interpreted as timestamps
const DATE_FIELDS: &[&str] = &[
    "created_at",
    "published_at",
    "updated_at",
    "first_published_at",
    "sort_by_date",
];

/// Top-level fields compared case-insensitively as text
const TEXT_FIELDS: &[&str] = &["name", "slug", "full_slug", "uuid", "lang"];

/// Top-level fields compared numerically
const NUMERIC_FIELDS: &[&str] = &["id", "position"];

/// A comparable value read from a record
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Date(DateTime<Utc>),
    /// Lowercased text
    Text(String),
    Number(f64),
    /// Missing or unparsable; always sorts last
    Unordered,
}

impl SortValue {
    pub const fn is_unordered(&self) -> bool {
        matches!(self, Self::Unordered)
    }
}

/// Extract the value of `field` from `record`.
///
/// Well-known story fields are read from the top level with a fixed type;
/// any other name is looked up in the `content` payload (an optional
/// `content.` prefix is stripped).
pub fn extract(record: &Record, field: &str) -> SortValue {
    let field = field.trim();

    if DATE_FIELDS.contains(&field) {
        return record
            .get(field)
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
            .map_or(SortValue::Unordered, SortValue::Date);
    }

    if TEXT_FIELDS.contains(&field) {
        return record
            .get(field)
            .and_then(Value::as_str)
            .map_or(SortValue::Unordered, |text| SortValue::Text(text.to_lowercase()));
    }

    if NUMERIC_FIELDS.contains(&field) {
        return record
            .get(field)
            .and_then(Value::as_f64)
            .map_or(SortValue::Unordered, SortValue::Number);
    }

    let path = field.strip_prefix("content.").unwrap_or(field);
    match record.content_field(path) {
        Some(Value::String(text)) => SortValue::Text(text.to_lowercase()),
        Some(Value::Number(number)) => number
            .as_f64()
            .map_or(SortValue::Unordered, SortValue::Number),
        _ => SortValue::Unordered,
    }
}
