//! Store and metadata collaborator interfaces

mod memory;

pub use memory::{MemoryMetadata, MemoryStore};

use crate::error::Result;
use crate::models::{KeyedRecord, Record};

/// Metadata key holding the persisted watermark (RFC 3339)
pub const WATERMARK_KEY: &str = "last_published_at";

/// Metadata key holding the persisted space version token
pub const VERSION_KEY: &str = "cache_version";

/// Keyed record storage for one collection.
///
/// `entries` returns records in insertion order. Setting an existing key
/// replaces the record in place; deleting and setting again moves it to the
/// end.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// All stored records in insertion order
    async fn entries(&self) -> Result<Vec<KeyedRecord>>;

    /// Insert or replace a record
    async fn set(&self, key: &str, record: &Record) -> Result<()>;

    /// Remove a record; missing keys are ignored
    async fn delete(&self, key: &str) -> Result<()>;

    /// Remove every record
    async fn clear(&self) -> Result<()>;
}

/// String key-value metadata for one collection
#[allow(async_fn_in_trait)]
pub trait MetadataStore {
    /// Load a value
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Save a value
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
