//! storysync-core - Core library for storysync
//!
//! This crate keeps local collections of headless-CMS records in step with a
//! remote content space: incremental fetching behind a watermark, version
//! gating shared across collections, and ordered reconciliation into a
//! pluggable record store (in memory or libSQL).

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod ordering;
pub mod source;
pub mod store;
pub mod sync;
pub mod util;

pub use client::{ContentVersion, Region, StoryblokClient};
pub use config::{CollectionConfig, CollectionKind, SyncConfig};
pub use error::{Error, Result};
pub use models::{IdentityField, KeyedRecord, Record};
pub use ordering::{OrderingRule, SortDirection};
pub use source::{ContentSource, FetchRequest, FetchTarget};
pub use store::{MetadataStore, RecordStore};
pub use sync::{SyncJob, SyncMode, SyncOutcome, Synchronizer};
