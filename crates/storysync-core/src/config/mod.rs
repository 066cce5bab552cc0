//! Sync configuration.
//!
//! A `SyncConfig` describes one remote space and the collections synced from
//! it. It is loaded from JSON and turned into one `SyncJob` per collection.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::client::{ContentVersion, Region};
use crate::error::{Error, Result};
use crate::models::IdentityField;
use crate::ordering::{resolve, CustomComparator, SortConfig};
use crate::source::FetchTarget;
use crate::sync::{SyncJob, SyncMode};
use crate::util::normalize_text_option;

/// Environment variable consulted when the config has no access token
pub const ACCESS_TOKEN_ENV: &str = "STORYBLOK_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub region: Region,
    /// Overrides the region's API origin
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub version: ContentVersion,
    #[serde(default)]
    pub collections: Vec<CollectionConfig>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    #[default]
    Stories,
    Datasource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    pub name: String,
    #[serde(default)]
    pub kind: CollectionKind,
    /// Stories: content types fetched and reconciled in order
    #[serde(default)]
    pub content_types: Vec<String>,
    /// Stories: key records by `uuid` instead of `full_slug`
    #[serde(default)]
    pub use_uuids: bool,
    /// Stories: `field:direction` ordering of the stored collection
    #[serde(default)]
    pub sort_by: Option<String>,
    /// Stories: overrides the mode implied by the content version
    #[serde(default)]
    pub mode: Option<SyncMode>,
    /// Stories: extra API query parameters
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Datasource: datasource slug
    #[serde(default)]
    pub datasource: Option<String>,
    /// Datasource: dimension to read values for
    #[serde(default)]
    pub dimension: Option<String>,
    /// Datasource: key entries by value and store the name as value
    #[serde(default)]
    pub switch_names_and_values: bool,
}

impl SyncConfig {
    /// Parse and validate a JSON config
    pub fn parse(raw: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(raw)
            .map_err(|error| Error::Config(format!("invalid config JSON: {error}")))?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|error| {
            Error::Config(format!(
                "Failed to read config at {}: {}",
                path.display(),
                error
            ))
        })?;
        Self::parse(&raw)
    }

    /// Access token from the config, falling back to `STORYBLOK_TOKEN`
    pub fn resolve_access_token(&self) -> Result<String> {
        self.access_token
            .clone()
            .or_else(|| normalize_text_option(std::env::var(ACCESS_TOKEN_ENV).ok()))
            .ok_or_else(|| {
                Error::Config(format!(
                    "no access token configured; set access_token or {ACCESS_TOKEN_ENV}"
                ))
            })
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionConfig> {
        self.collections
            .iter()
            .find(|collection| collection.name == name)
    }

    /// Build the sync job of every collection
    pub fn jobs(&self) -> Vec<SyncJob> {
        self.collections
            .iter()
            .map(|collection| collection.to_job(self.version, None))
            .collect()
    }

    fn normalize(&mut self) {
        self.access_token = normalize_text_option(self.access_token.take());
        self.base_url = normalize_text_option(self.base_url.take());
        for collection in &mut self.collections {
            collection.normalize();
        }
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for collection in &self.collections {
            if collection.name.is_empty() {
                return Err(Error::Config(
                    "collection name must not be empty".to_string(),
                ));
            }
            if !seen.insert(collection.name.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate collection name '{}'",
                    collection.name
                )));
            }
            collection.validate()?;
        }
        Ok(())
    }
}

impl CollectionConfig {
    /// Build the sync job for this collection.
    ///
    /// `custom` takes precedence over every configured ordering.
    pub fn to_job(&self, version: ContentVersion, custom: Option<CustomComparator>) -> SyncJob {
        match self.kind {
            CollectionKind::Stories => {
                let identity = if self.use_uuids { "uuid" } else { "full_slug" };
                let mut job = SyncJob::new(
                    self.name.clone(),
                    FetchTarget::Stories,
                    IdentityField::new(identity),
                );
                job.categories = self.content_types.clone();
                job.ordering = resolve(&SortConfig {
                    custom,
                    sort_by: self.sort_by.clone(),
                    legacy_sort_by: self.params.get("sort_by").cloned(),
                });
                // Draft edits don't move `published_at`, so drafts are always re-fetched.
                job.mode = self.mode.unwrap_or(match version {
                    ContentVersion::Draft => SyncMode::Full,
                    ContentVersion::Published => SyncMode::Incremental,
                });
                job.params = self.params.clone();
                job
            }
            CollectionKind::Datasource => {
                let mut job = SyncJob::new(
                    self.name.clone(),
                    FetchTarget::Datasource {
                        datasource: self.datasource.clone().unwrap_or_default(),
                        dimension: self.dimension.clone(),
                        switch_names_and_values: self.switch_names_and_values,
                    },
                    IdentityField::new("name"),
                );
                job.mode = SyncMode::Full;
                job
            }
        }
    }

    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.content_types = self
            .content_types
            .drain(..)
            .filter_map(|content_type| normalize_text_option(Some(content_type)))
            .collect();
        self.sort_by = normalize_text_option(self.sort_by.take());
        self.datasource = normalize_text_option(self.datasource.take());
        self.dimension = normalize_text_option(self.dimension.take());
    }

    fn validate(&self) -> Result<()> {
        match self.kind {
            CollectionKind::Stories => {
                if self.datasource.is_some() || self.dimension.is_some() {
                    return Err(Error::Config(format!(
                        "collection '{}': datasource settings require kind \"datasource\"",
                        self.name
                    )));
                }
            }
            CollectionKind::Datasource => {
                if self.datasource.is_none() {
                    return Err(Error::Config(format!(
                        "collection '{}': datasource slug is required",
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }
}
