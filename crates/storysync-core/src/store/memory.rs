//! In-memory store implementations

use std::collections::HashMap;

use tokio::sync::Mutex;

use super::{MetadataStore, RecordStore};
use crate::error::Result;
use crate::models::{KeyedRecord, Record};

/// Insertion-ordered in-memory `RecordStore`
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<KeyedRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`, in order
    pub fn with_records(records: impl IntoIterator<Item = KeyedRecord>) -> Self {
        Self {
            records: Mutex::new(records.into_iter().collect()),
        }
    }

    /// Stored keys in order
    pub async fn keys(&self) -> Vec<String> {
        self.records
            .lock()
            .await
            .iter()
            .map(|entry| entry.key.clone())
            .collect()
    }
}

impl RecordStore for MemoryStore {
    async fn entries(&self) -> Result<Vec<KeyedRecord>> {
        Ok(self.records.lock().await.clone())
    }

    async fn set(&self, key: &str, record: &Record) -> Result<()> {
        let mut records = self.records.lock().await;
        if let Some(existing) = records.iter_mut().find(|entry| entry.key == key) {
            existing.record = record.clone();
        } else {
            records.push(KeyedRecord::new(key, record.clone()));
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.records.lock().await.retain(|entry| entry.key != key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.records.lock().await.clear();
        Ok(())
    }
}

/// In-memory `MetadataStore`
#[derive(Debug, Default)]
pub struct MemoryMetadata {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create metadata pre-populated with `values`
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }
}

impl MetadataStore for MemoryMetadata {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
