use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use storysync_core::db::{Database, LibSqlMetadataStore, LibSqlRecordStore};
use storysync_core::store::{VERSION_KEY, WATERMARK_KEY};
use storysync_core::{
    CollectionConfig, CollectionKind, KeyedRecord, MetadataStore, Record, RecordStore,
    StoryblokClient, SyncConfig, SyncOutcome,
};

use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct RecordListItem {
    pub key: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub published_at: Option<String>,
    pub record: Value,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CollectionStatus {
    pub name: String,
    pub kind: CollectionKind,
    pub records: usize,
    pub version: Option<String>,
    pub watermark: Option<String>,
}

pub fn resolve_config_path(cli_config_path: Option<PathBuf>) -> PathBuf {
    cli_config_path
        .or_else(|| env::var_os("STORYSYNC_CONFIG").map(PathBuf::from))
        .unwrap_or_else(default_config_path)
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("storysync")
        .join("config.json")
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("STORYSYNC_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("storysync")
        .join("storysync.db")
}

pub fn load_config(path: &Path) -> Result<SyncConfig, CliError> {
    Ok(SyncConfig::load_from_path(path)?)
}

pub async fn open_database(path: &Path) -> Result<Database, CliError> {
    Ok(Database::open(path).await?)
}

pub fn build_client(config: &SyncConfig) -> Result<StoryblokClient, CliError> {
    let token = config.resolve_access_token()?;
    let client = match &config.base_url {
        Some(base_url) => StoryblokClient::with_base_url(token, base_url, config.version)?,
        None => StoryblokClient::new(token, config.region, config.version)?,
    };
    Ok(client)
}

/// Collections named on the command line, or all of them when none are
pub fn select_collections<'a>(
    config: &'a SyncConfig,
    names: &[String],
) -> Result<Vec<&'a CollectionConfig>, CliError> {
    if names.is_empty() {
        return Ok(config.collections.iter().collect());
    }

    names
        .iter()
        .map(|name| {
            config
                .collection(name.trim())
                .ok_or_else(|| CliError::UnknownCollection(name.clone()))
        })
        .collect()
}

pub async fn list_records(
    collection: &str,
    limit: usize,
    db_path: &Path,
) -> Result<Vec<KeyedRecord>, CliError> {
    let db = open_database(db_path).await?;
    let store = LibSqlRecordStore::new(db.connection(), collection);
    let mut entries = store.entries().await?;
    entries.truncate(limit);
    Ok(entries)
}

pub async fn collect_statuses(
    config: &SyncConfig,
    db_path: &Path,
) -> Result<Vec<CollectionStatus>, CliError> {
    let db = open_database(db_path).await?;
    let mut statuses = Vec::with_capacity(config.collections.len());

    for collection in &config.collections {
        let store = LibSqlRecordStore::new(db.connection(), collection.name.as_str());
        let meta = LibSqlMetadataStore::new(db.connection(), collection.name.as_str());
        statuses.push(CollectionStatus {
            name: collection.name.clone(),
            kind: collection.kind,
            records: store.count().await?,
            version: meta.get(VERSION_KEY).await?,
            watermark: meta.get(WATERMARK_KEY).await?,
        });
    }

    Ok(statuses)
}

pub fn record_to_list_item(entry: &KeyedRecord) -> RecordListItem {
    RecordListItem {
        key: entry.key.clone(),
        name: text_field(&entry.record, "name"),
        category: entry.record.category().map(str::to_string),
        published_at: text_field(&entry.record, "published_at"),
        record: entry.record.clone().into_value(),
    }
}

pub fn format_record_lines(entries: &[KeyedRecord]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let category = entry.record.category().unwrap_or("-");
            let published = entry.record.published_at().map_or_else(
                || "unpublished".to_string(),
                |at| at.format("%Y-%m-%d %H:%M").to_string(),
            );
            format!("{:<40}  {category:<16}  {published}", entry.key)
        })
        .collect()
}

pub fn format_status_lines(statuses: &[CollectionStatus]) -> Vec<String> {
    statuses
        .iter()
        .map(|status| {
            format!(
                "{:<20}  records={:<6}  version={}  watermark={}",
                status.name,
                status.records,
                status.version.as_deref().unwrap_or("-"),
                status.watermark.as_deref().unwrap_or("-")
            )
        })
        .collect()
}

pub fn format_outcome(collection: &str, outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Pushed { key } => format!("{collection}: pushed {key}"),
        SyncOutcome::UpToDate { version } => {
            format!("{collection}: up to date (version {version})")
        }
        SyncOutcome::Synced {
            fetched,
            skipped,
            stored,
            ..
        } => {
            let mut line = format!("{collection}: fetched {fetched}, stored {stored}");
            if *skipped > 0 {
                line.push_str(&format!(", skipped {skipped}"));
            }
            line
        }
    }
}

/// Parse a push payload: a webhook body `{"story": {...}}` or a bare story
pub fn parse_pushed_record(raw: &str) -> Result<Record, CliError> {
    let mut payload: Value =
        serde_json::from_str(raw).map_err(|error| CliError::InvalidPayload(error.to_string()))?;

    let story = if payload.get("story").is_some_and(Value::is_object) {
        payload["story"].take()
    } else {
        payload
    };

    Record::from_value(story).map_err(|error| CliError::InvalidPayload(error.to_string()))
}

pub fn read_push_input(file: Option<&Path>) -> Result<String, CliError> {
    let raw = match file {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => read_piped_stdin()?,
    };

    raw.and_then(|raw| normalize_content(&raw))
        .ok_or(CliError::EmptyInput)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

fn text_field(record: &Record, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
}
