//! Data models for storysync

mod record;

pub use record::{IdentityField, KeyedRecord, Record};
