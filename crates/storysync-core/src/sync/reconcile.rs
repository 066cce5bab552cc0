//! Merge of freshly fetched records into a stored collection.
//!
//! Reconciliation works on the logical before/after record lists of one
//! category. Stored records outside the category are never returned or
//! reordered; the caller replaces exactly the `scoped_before` keys with the
//! reconciled `records`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::watermark;
use crate::models::KeyedRecord;
use crate::ordering::OrderingRule;

/// Result of reconciling one fresh batch
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Keys of the stored records that were in scope, in stored order
    pub scoped_before: Vec<String>,
    /// The new contents of the scope, in final order
    pub records: Vec<KeyedRecord>,
    /// Watermark after folding the final scoped set
    pub watermark: Option<DateTime<Utc>>,
}

/// Merge `fresh` into the `stored` records of `category`.
///
/// Stored records sharing a key with a fresh record are replaced by it.
/// Duplicate keys inside `fresh` itself are kept as-is.
pub fn reconcile(
    fresh: Vec<KeyedRecord>,
    stored: Vec<KeyedRecord>,
    category: Option<&str>,
    rule: &OrderingRule,
    watermark: Option<DateTime<Utc>>,
) -> Reconciliation {
    let scoped: Vec<KeyedRecord> = stored
        .into_iter()
        .filter(|entry| entry.record.in_category(category))
        .collect();
    let scoped_before = scoped.iter().map(|entry| entry.key.clone()).collect();

    if fresh.is_empty() {
        return Reconciliation {
            scoped_before,
            records: scoped,
            watermark,
        };
    }

    let fresh_keys: HashSet<&str> = fresh.iter().map(|entry| entry.key.as_str()).collect();
    let mut records: Vec<KeyedRecord> = scoped
        .into_iter()
        .filter(|entry| !fresh_keys.contains(entry.key.as_str()))
        .collect();
    records.extend(fresh);

    // `sort_by` is stable: stored records keep their prior relative order and
    // fresh records keep fetch order among equals.
    rule.sort(&mut records);

    let watermark = watermark::fold(watermark, &records);
    Reconciliation {
        scoped_before,
        records,
        watermark,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use crate::ordering::SortDirection;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn story(key: &str, component: &str, created_at: &str) -> KeyedRecord {
        KeyedRecord::new(
            key,
            Record::from_value(json!({
                "full_slug": key,
                "created_at": created_at,
                "published_at": created_at,
                "content": { "component": component }
            }))
            .unwrap(),
        )
    }

    fn keys(records: &[KeyedRecord]) -> Vec<&str> {
        records.iter().map(|entry| entry.key.as_str()).collect()
    }

    fn day(day: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap())
    }

    #[test]
    fn inserts_fresh_record_in_sorted_position() {
        let stored = vec![
            story("b", "post", "2024-01-20T00:00:00Z"),
            story("a", "post", "2024-01-10T00:00:00Z"),
        ];
        let fresh = vec![story("c", "post", "2024-01-15T00:00:00Z")];
        let rule = OrderingRule::standard("created_at", SortDirection::Descending);

        let result = reconcile(fresh, stored, Some("post"), &rule, day(20));

        assert_eq!(keys(&result.records), vec!["b", "c", "a"]);
        assert_eq!(result.scoped_before, vec!["b", "a"]);
        assert_eq!(result.watermark, day(20));
    }

    #[test]
    fn fresh_record_supersedes_stored_counterpart() {
        let stored = vec![
            story("a", "post", "2024-01-01T00:00:00Z"),
            story("b", "post", "2024-01-02T00:00:00Z"),
        ];
        let updated = story("a", "post", "2024-01-05T00:00:00Z");
        let result = reconcile(
            vec![updated.clone()],
            stored,
            None,
            &OrderingRule::None,
            None,
        );

        assert_eq!(keys(&result.records), vec!["b", "a"]);
        assert_eq!(result.records[1], updated);
        assert_eq!(result.watermark, day(5));
    }

    #[test]
    fn none_rule_appends_fresh_in_fetch_order() {
        let stored = vec![
            story("z", "post", "2024-01-09T00:00:00Z"),
            story("y", "post", "2024-01-01T00:00:00Z"),
        ];
        let fresh = vec![
            story("m", "post", "2024-01-03T00:00:00Z"),
            story("k", "post", "2024-01-02T00:00:00Z"),
        ];
        let result = reconcile(fresh, stored, None, &OrderingRule::None, None);
        assert_eq!(keys(&result.records), vec!["z", "y", "m", "k"]);
    }

    #[test]
    fn other_categories_are_untouched() {
        let stored = vec![
            story("p1", "page", "2024-01-01T00:00:00Z"),
            story("a", "post", "2024-01-02T00:00:00Z"),
            story("p2", "page", "2024-01-30T00:00:00Z"),
        ];
        let fresh = vec![story("b", "post", "2024-01-03T00:00:00Z")];
        let rule = OrderingRule::standard("created_at", SortDirection::Ascending);

        let result = reconcile(fresh, stored, Some("post"), &rule, None);

        assert_eq!(result.scoped_before, vec!["a"]);
        assert_eq!(keys(&result.records), vec!["a", "b"]);
        // p2's later timestamp lives outside the scope.
        assert_eq!(result.watermark, day(3));
    }

    #[test]
    fn empty_batch_passes_scope_through() {
        let stored = vec![
            story("a", "post", "2024-01-09T00:00:00Z"),
            story("b", "post", "2024-01-01T00:00:00Z"),
        ];
        let rule = OrderingRule::standard("created_at", SortDirection::Ascending);
        let result = reconcile(Vec::new(), stored.clone(), None, &rule, day(2));

        assert_eq!(result.records, stored);
        assert_eq!(result.watermark, day(2));
    }

    #[test]
    fn duplicates_within_fresh_batch_are_retained() {
        let fresh = vec![
            story("a", "post", "2024-01-01T00:00:00Z"),
            story("a", "post", "2024-01-02T00:00:00Z"),
        ];
        let result = reconcile(fresh, Vec::new(), None, &OrderingRule::None, None);
        assert_eq!(keys(&result.records), vec!["a", "a"]);
    }

    #[test]
    fn reconciling_twice_is_idempotent() {
        let stored = vec![
            story("a", "post", "2024-01-10T00:00:00Z"),
            story("b", "post", "2024-01-20T00:00:00Z"),
        ];
        let fresh = vec![
            story("c", "post", "2024-01-15T00:00:00Z"),
            story("a", "post", "2024-01-11T00:00:00Z"),
        ];
        let rule = OrderingRule::standard("created_at", SortDirection::Descending);

        let once = reconcile(fresh.clone(), stored, None, &rule, None);
        let twice = reconcile(fresh, once.records.clone(), None, &rule, once.watermark);

        assert_eq!(once.records, twice.records);
        assert_eq!(once.watermark, twice.watermark);
    }

    #[test]
    fn no_key_appears_twice_across_stored_and_fresh() {
        let stored: Vec<_> = (1..=9)
            .map(|n| story(&format!("s{n}"), "post", &format!("2024-01-0{n}T00:00:00Z")))
            .collect();
        let fresh: Vec<_> = [2, 4, 6, 10]
            .iter()
            .map(|n| story(&format!("s{n}"), "post", "2024-02-01T00:00:00Z"))
            .collect();
        let rule = OrderingRule::standard("created_at", SortDirection::Ascending);

        let result = reconcile(fresh, stored, Some("post"), &rule, None);

        let unique: HashSet<_> = result.records.iter().map(|entry| &entry.key).collect();
        assert_eq!(unique.len(), result.records.len());
        assert_eq!(result.records.len(), 10);
    }

    #[test]
    fn unordered_records_end_up_last() {
        let undated = KeyedRecord::new(
            "u",
            Record::from_value(json!({ "content": { "component": "post" } })).unwrap(),
        );
        let stored = vec![undated, story("a", "post", "2024-01-01T00:00:00Z")];
        let fresh = vec![story("b", "post", "2024-01-05T00:00:00Z")];
        let rule = OrderingRule::standard("created_at", SortDirection::Descending);

        let result = reconcile(fresh, stored, None, &rule, None);
        assert_eq!(keys(&result.records), vec!["b", "a", "u"]);
    }
}
