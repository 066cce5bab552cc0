//! Per-collection sync pass

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reconcile::{reconcile, Reconciliation};
use super::version::{is_up_to_date, VersionCoordinator};
use super::watermark;
use crate::error::{Error, Result};
use crate::models::{IdentityField, KeyedRecord, Record};
use crate::ordering::OrderingRule;
use crate::source::{ContentSource, FetchRequest, FetchTarget};
use crate::store::{MetadataStore, RecordStore, VERSION_KEY, WATERMARK_KEY};

/// How much of a collection is re-fetched on each pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Fetch only records published after the stored watermark
    #[default]
    Incremental,
    /// Clear the collection and fetch everything
    Full,
}

/// Everything needed to sync one collection
#[derive(Debug, Clone)]
pub struct SyncJob {
    /// Collection name, used for logging and error context
    pub collection: String,
    pub target: FetchTarget,
    /// Categories fetched and reconciled in order; empty means one
    /// uncategorized pass
    pub categories: Vec<String>,
    pub identity: IdentityField,
    pub ordering: OrderingRule,
    pub mode: SyncMode,
    /// Skip the version gate and fetch even when the space is unchanged
    pub force: bool,
    /// Extra query parameters for every fetch
    pub params: BTreeMap<String, String>,
}

impl SyncJob {
    pub fn new(
        collection: impl Into<String>,
        target: FetchTarget,
        identity: IdentityField,
    ) -> Self {
        Self {
            collection: collection.into(),
            target,
            categories: Vec::new(),
            identity,
            ordering: OrderingRule::None,
            mode: SyncMode::Incremental,
            force: false,
            params: BTreeMap::new(),
        }
    }
}

/// What a sync pass did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A pushed record was written directly
    Pushed { key: String },
    /// The space version matched the stored one; nothing was fetched
    UpToDate { version: u64 },
    /// Records were fetched and reconciled
    Synced {
        fetched: usize,
        skipped: usize,
        stored: usize,
        version: Option<u64>,
        watermark: Option<DateTime<Utc>>,
    },
}

/// Runs sync passes against one content source.
///
/// Clones share the source and the version coordinator, so every collection
/// of a space should be synced through clones of one `Synchronizer`.
pub struct Synchronizer<S> {
    source: Arc<S>,
    versions: VersionCoordinator<S>,
}

impl<S> Clone for Synchronizer<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            versions: self.versions.clone(),
        }
    }
}

impl<S> Synchronizer<S>
where
    S: ContentSource + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        Self {
            versions: VersionCoordinator::new(Arc::clone(&source)),
            source,
        }
    }

    /// Sync one collection, or write `push` directly when given.
    ///
    /// Failures are logged and returned wrapped with the collection name.
    /// Categories written before a failure stay written.
    pub async fn sync<R, M>(
        &self,
        job: &SyncJob,
        store: &R,
        meta: &M,
        push: Option<Record>,
    ) -> Result<SyncOutcome>
    where
        R: RecordStore,
        M: MetadataStore,
    {
        let result = match push {
            Some(record) => push_record(job, store, record).await,
            None => self.poll(job, store, meta).await,
        };

        result.map_err(|error| {
            tracing::error!(collection = %job.collection, error = %error, "Sync failed");
            error.in_collection(&job.collection)
        })
    }

    async fn poll<R, M>(&self, job: &SyncJob, store: &R, meta: &M) -> Result<SyncOutcome>
    where
        R: RecordStore,
        M: MetadataStore,
    {
        let version = match self.versions.current_version(&job.collection).await {
            Ok(version) => Some(version),
            Err(error) => {
                tracing::warn!(
                    collection = %job.collection,
                    error = %error,
                    "Continuing without space version"
                );
                None
            }
        };

        let stored_version = meta.get(VERSION_KEY).await?;
        if let Some(version) = version.filter(|_| !job.force) {
            if is_up_to_date(stored_version.as_deref(), Some(version)) {
                tracing::debug!(collection = %job.collection, version, "Collection is up to date");
                return Ok(SyncOutcome::UpToDate { version });
            }
        }

        let stored_watermark = load_watermark(job, meta).await?;
        let published_after = match job.mode {
            SyncMode::Incremental => stored_watermark,
            SyncMode::Full => {
                store.clear().await?;
                None
            }
        };
        tracing::debug!(
            collection = %job.collection,
            mode = ?job.mode,
            published_after = ?published_after,
            "Fetching records"
        );

        let categories: Vec<Option<&str>> = if job.categories.is_empty() {
            vec![None]
        } else {
            job.categories.iter().map(|name| Some(name.as_str())).collect()
        };

        let mut watermark = stored_watermark;
        let mut fetched = 0;
        let mut skipped = 0;

        for category in categories {
            let request = FetchRequest {
                target: job.target.clone(),
                category: category.map(str::to_string),
                published_after,
                params: job.params.clone(),
            };
            let records = self.source.fetch_records(request).await?;
            fetched += records.len();

            let fresh = identify_batch(job, records, &mut skipped);
            if fresh.is_empty() {
                tracing::debug!(
                    collection = %job.collection,
                    category = ?category,
                    "No new records"
                );
                continue;
            }

            let stored = store.entries().await?;
            let merged = reconcile(fresh, stored, category, &job.ordering, watermark);
            write_back(store, &merged).await?;
            watermark = merged.watermark;
        }

        if let Some(watermark) = watermark {
            meta.set(WATERMARK_KEY, &watermark::format(watermark)).await?;
        }
        if let Some(version) = version {
            meta.set(VERSION_KEY, &version.to_string()).await?;
        }

        let stored = store.entries().await?.len();
        tracing::info!(
            collection = %job.collection,
            fetched,
            skipped,
            stored,
            "Sync completed"
        );

        Ok(SyncOutcome::Synced {
            fetched,
            skipped,
            stored,
            version,
            watermark,
        })
    }
}

/// Write one record into the collection without fetching.
///
/// The record is keyed by the job's identity field and replaces any stored
/// record with the same key in place.
pub async fn push_record<R: RecordStore>(
    job: &SyncJob,
    store: &R,
    record: Record,
) -> Result<SyncOutcome> {
    let key = job.identity.key_for(&record).ok_or_else(|| {
        Error::InvalidInput(format!(
            "pushed record has no '{}' identity field",
            job.identity
        ))
    })?;
    store.set(&key, &record).await?;
    tracing::info!(collection = %job.collection, key = %key, "Applied pushed record");
    Ok(SyncOutcome::Pushed { key })
}

async fn load_watermark<M: MetadataStore>(
    job: &SyncJob,
    meta: &M,
) -> Result<Option<DateTime<Utc>>> {
    let Some(raw) = meta.get(WATERMARK_KEY).await? else {
        return Ok(None);
    };
    let parsed = watermark::parse(&raw);
    if parsed.is_none() {
        tracing::warn!(
            collection = %job.collection,
            value = %raw,
            "Ignoring unreadable stored watermark"
        );
    }
    Ok(parsed)
}

/// Key fetched records, dropping those without an identity value
fn identify_batch(job: &SyncJob, records: Vec<Record>, skipped: &mut usize) -> Vec<KeyedRecord> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.get("id").cloned();
            let keyed = KeyedRecord::identify(record, &job.identity);
            if keyed.is_none() {
                *skipped += 1;
                tracing::warn!(
                    collection = %job.collection,
                    identity = %job.identity,
                    record_id = ?id,
                    "Skipping record without identity value"
                );
            }
            keyed
        })
        .collect()
}

/// Replace the reconciled scope in the store, preserving final order
async fn write_back<R: RecordStore>(store: &R, merged: &Reconciliation) -> Result<()> {
    for key in &merged.scoped_before {
        store.delete(key).await?;
    }
    for entry in &merged.records {
        store.set(&entry.key, &entry.record).await?;
    }
    Ok(())
}
