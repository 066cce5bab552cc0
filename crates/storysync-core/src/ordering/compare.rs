//! Record comparison under an ordering rule

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::field::{extract, SortValue};
use crate::models::{KeyedRecord, Record};

/// Signature of a caller-supplied total order over records.
///
/// `Less` places the first record before the second, `Greater` after it and
/// `Equal` keeps their existing relative order.
pub type CompareFn = dyn Fn(&Record, &Record) -> Ordering + Send + Sync;

/// Shareable handle to a custom comparison function
#[derive(Clone)]
pub struct CustomComparator(Arc<CompareFn>);

impl CustomComparator {
    pub fn new(compare: impl Fn(&Record, &Record) -> Ordering + Send + Sync + 'static) -> Self {
        Self(Arc::new(compare))
    }

    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        (self.0)(a, b)
    }
}

impl fmt::Debug for CustomComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomComparator(..)")
    }
}

impl PartialEq for CustomComparator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Sort direction of a standard ordering rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parse `asc`/`desc` (case-insensitive); anything else is ascending
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            Self::Descending
        } else {
            Self::Ascending
        }
    }
}

/// The effective ordering applied during reconciliation
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OrderingRule {
    /// Keep stored order and append fresh records
    #[default]
    None,
    /// Order by one field in the given direction
    Standard {
        field: String,
        direction: SortDirection,
    },
    /// Order by a caller-supplied function
    Custom(CustomComparator),
}

impl OrderingRule {
    pub fn standard(field: impl Into<String>, direction: SortDirection) -> Self {
        Self::Standard {
            field: field.into(),
            direction,
        }
    }

    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Stable sort of keyed records under this rule
    pub fn sort(&self, records: &mut [KeyedRecord]) {
        if self.is_none() {
            return;
        }
        records.sort_by(|a, b| compare(&a.record, &b.record, self));
    }
}

/// Compare two records under `rule`
pub fn compare(a: &Record, b: &Record, rule: &OrderingRule) -> Ordering {
    match rule {
        OrderingRule::None => Ordering::Equal,
        OrderingRule::Custom(comparator) => comparator.compare(a, b),
        OrderingRule::Standard { field, direction } => {
            let left = extract(a, field);
            let right = extract(b, field);
            match (left.is_unordered(), right.is_unordered()) {
                (true, true) => Ordering::Equal,
                // Unordered values sort last in both directions.
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let ordering = compare_values(&left, &right);
                    match direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                }
            }
        }
    }
}

fn compare_values(left: &SortValue, right: &SortValue) -> Ordering {
    match (left, right) {
        (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
        (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
        (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}

const fn type_rank(value: &SortValue) -> u8 {
    match value {
        SortValue::Date(_) => 0,
        SortValue::Number(_) => 1,
        SortValue::Text(_) => 2,
        SortValue::Unordered => 3,
    }
}
