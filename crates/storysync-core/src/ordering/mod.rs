//! Record ordering: field extraction, comparison and rule resolution

mod compare;
mod field;
mod resolve;

pub use compare::{compare, CompareFn, CustomComparator, OrderingRule, SortDirection};
pub use field::{extract, SortValue};
pub use resolve::{parse_descriptor, resolve, SortConfig};
