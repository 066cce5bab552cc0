//! Published-at watermark tracking

use chrono::{DateTime, Utc};

use crate::models::KeyedRecord;

/// The later of two optional timestamps, with `None` as the earliest value
pub fn advance(
    current: Option<DateTime<Utc>>,
    candidate: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    current.max(candidate)
}

/// Fold the published timestamps of `records` into `start`
pub fn fold<'a>(
    start: Option<DateTime<Utc>>,
    records: impl IntoIterator<Item = &'a KeyedRecord>,
) -> Option<DateTime<Utc>> {
    records
        .into_iter()
        .fold(start, |current, entry| advance(current, entry.record.published_at()))
}

/// Serialize a watermark for the metadata store
pub fn format(watermark: DateTime<Utc>) -> String {
    watermark.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Parse a persisted watermark; unreadable values are discarded
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
