//! libSQL-backed record and metadata stores

use crate::error::Result;
use crate::models::{KeyedRecord, Record};
use crate::store::{MetadataStore, RecordStore};
use libsql::Connection;

/// `RecordStore` over the `records` table, scoped to one collection
pub struct LibSqlRecordStore<'a> {
    conn: &'a Connection,
    collection: String,
}

impl<'a> LibSqlRecordStore<'a> {
    /// Create a store for `collection` on the given connection
    pub fn new(conn: &'a Connection, collection: impl Into<String>) -> Self {
        Self {
            conn,
            collection: collection.into(),
        }
    }

    /// Number of records stored for this collection
    pub async fn count(&self) -> Result<usize> {
        let mut rows = self
            .conn
            .query(
                "SELECT COUNT(*) FROM records WHERE collection = ?",
                [self.collection.as_str()],
            )
            .await?;

        let count = match rows.next().await? {
            Some(row) => row.get::<i64>(0)?,
            None => 0,
        };
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

impl RecordStore for LibSqlRecordStore<'_> {
    async fn entries(&self) -> Result<Vec<KeyedRecord>> {
        let mut rows = self
            .conn
            .query(
                "SELECT key, data FROM records WHERE collection = ? ORDER BY seq",
                [self.collection.as_str()],
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            let key: String = row.get(0)?;
            let data: String = row.get(1)?;
            let record: Record = serde_json::from_str(&data)?;
            entries.push(KeyedRecord { key, record });
        }
        Ok(entries)
    }

    async fn set(&self, key: &str, record: &Record) -> Result<()> {
        let data = serde_json::to_string(record)?;
        self.conn
            .execute(
                "INSERT INTO records (collection, key, data) VALUES (?, ?, ?)
                 ON CONFLICT (collection, key) DO UPDATE SET data = excluded.data",
                [self.collection.as_str(), key, data.as_str()],
            )
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM records WHERE collection = ? AND key = ?",
                [self.collection.as_str(), key],
            )
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM records WHERE collection = ?",
                [self.collection.as_str()],
            )
            .await?;
        Ok(())
    }
}

/// `MetadataStore` over the `sync_meta` table, scoped to one collection
pub struct LibSqlMetadataStore<'a> {
    conn: &'a Connection,
    collection: String,
}

impl<'a> LibSqlMetadataStore<'a> {
    /// Create a metadata store for `collection` on the given connection
    pub fn new(conn: &'a Connection, collection: impl Into<String>) -> Self {
        Self {
            conn,
            collection: collection.into(),
        }
    }
}

impl MetadataStore for LibSqlMetadataStore<'_> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT value FROM sync_meta WHERE collection = ? AND key = ?",
                [self.collection.as_str(), key],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO sync_meta (collection, key, value) VALUES (?, ?, ?)",
                [self.collection.as_str(), key, value],
            )
            .await?;
        Ok(())
    }
}
