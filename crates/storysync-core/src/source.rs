//! Fetch collaborator interface

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::Record;

/// What a fetch request reads from the remote space
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTarget {
    Stories,
    Datasource {
        datasource: String,
        dimension: Option<String>,
        /// Exchange each entry's `name` and `value` before returning it
        switch_names_and_values: bool,
    },
}

/// Parameters for one fetch of records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub target: FetchTarget,
    /// Content type to restrict stories to
    pub category: Option<String>,
    /// Only return records published strictly after this instant
    pub published_after: Option<DateTime<Utc>>,
    /// Extra query parameters passed through to the API
    pub params: BTreeMap<String, String>,
}

impl FetchRequest {
    pub const fn new(target: FetchTarget) -> Self {
        Self {
            target,
            category: None,
            published_after: None,
            params: BTreeMap::new(),
        }
    }
}

/// A remote content space that records and version tokens are read from
pub trait ContentSource: Send + Sync {
    /// Fetch every record matching `request`
    fn fetch_records(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = Result<Vec<Record>>> + Send;

    /// Fetch the current version token of the space
    fn fetch_version(&self) -> impl Future<Output = Result<u64>> + Send;
}
