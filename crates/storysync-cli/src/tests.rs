use std::path::PathBuf;

use pretty_assertions::assert_eq;
use serde_json::json;
use storysync_core::{ContentVersion, KeyedRecord, Record, SyncConfig, SyncMode, SyncOutcome};
use tempfile::TempDir;

use crate::commands::common::{
    collect_statuses, format_outcome, format_record_lines, format_status_lines, list_records,
    normalize_content, parse_pushed_record, read_push_input, record_to_list_item,
    resolve_db_path, select_collections,
};
use crate::commands::push::run_push;
use crate::commands::sync::build_job;
use crate::error::CliError;

const CONFIG: &str = r#"
{
  "collections": [
    { "name": "posts", "content_types": ["post"], "sort_by": "published_at:desc" },
    { "name": "colors", "kind": "datasource", "datasource": "colors" }
  ]
}
"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), CONFIG).unwrap();
        Self { dir }
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.json")
    }

    fn db_path(&self) -> PathBuf {
        self.dir.path().join("data").join("storysync.db")
    }

    fn write_payload(&self, name: &str, payload: &serde_json::Value) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, payload.to_string()).unwrap();
        path
    }
}

fn keyed(key: &str, value: serde_json::Value) -> KeyedRecord {
    KeyedRecord::new(key, Record::from_value(value).unwrap())
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  {}  "), Some("{}".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn parse_pushed_record_accepts_webhook_and_bare_story() {
    let webhook =
        parse_pushed_record(r#"{"story": {"full_slug": "blog/a"}, "action": "published"}"#)
            .unwrap();
    assert_eq!(webhook.get("full_slug"), Some(&json!("blog/a")));
    assert_eq!(webhook.get("action"), None);

    let bare = parse_pushed_record(r#"{"full_slug": "blog/b"}"#).unwrap();
    assert_eq!(bare.get("full_slug"), Some(&json!("blog/b")));
}

#[test]
fn parse_pushed_record_rejects_non_objects() {
    assert!(matches!(
        parse_pushed_record("[1, 2]"),
        Err(CliError::InvalidPayload(_))
    ));
    assert!(matches!(
        parse_pushed_record("not json"),
        Err(CliError::InvalidPayload(_))
    ));
}

#[test]
fn select_collections_defaults_to_all() {
    let config = SyncConfig::parse(CONFIG).unwrap();

    let all = select_collections(&config, &[]).unwrap();
    assert_eq!(all.len(), 2);

    let selected = select_collections(&config, &["colors".to_string()]).unwrap();
    assert_eq!(selected[0].name, "colors");

    assert!(matches!(
        select_collections(&config, &["missing".to_string()]),
        Err(CliError::UnknownCollection(name)) if name == "missing"
    ));
}

#[test]
fn full_flag_forces_a_clearing_fetch() {
    let config = SyncConfig::parse(CONFIG).unwrap();
    let posts = config.collection("posts").unwrap();

    let regular = build_job(posts, ContentVersion::Published, false);
    assert_eq!(regular.mode, SyncMode::Incremental);
    assert!(!regular.force);

    let full = build_job(posts, ContentVersion::Published, true);
    assert_eq!(full.mode, SyncMode::Full);
    assert!(full.force);
}

#[test]
fn format_outcome_describes_each_result() {
    assert_eq!(
        format_outcome("posts", &SyncOutcome::UpToDate { version: 42 }),
        "posts: up to date (version 42)"
    );
    assert_eq!(
        format_outcome(
            "posts",
            &SyncOutcome::Pushed {
                key: "blog/a".to_string()
            }
        ),
        "posts: pushed blog/a"
    );
    assert_eq!(
        format_outcome(
            "posts",
            &SyncOutcome::Synced {
                fetched: 3,
                skipped: 1,
                stored: 2,
                version: Some(7),
                watermark: None,
            }
        ),
        "posts: fetched 3, stored 2, skipped 1"
    );
}

#[test]
fn format_record_lines_include_category_and_date() {
    let entries = vec![
        keyed(
            "blog/a",
            json!({
                "full_slug": "blog/a",
                "published_at": "2024-03-01T10:30:00.000Z",
                "content": { "component": "post" }
            }),
        ),
        keyed("blue", json!({ "name": "blue", "value": "#00f" })),
    ];

    let lines = format_record_lines(&entries);
    assert!(lines[0].starts_with("blog/a"));
    assert!(lines[0].contains("post"));
    assert!(lines[0].contains("2024-03-01 10:30"));
    assert!(lines[1].contains("unpublished"));
}

#[test]
fn record_to_list_item_extracts_summary_fields() {
    let entry = keyed(
        "blog/a",
        json!({
            "name": "A",
            "published_at": "2024-03-01T10:30:00.000Z",
            "content": { "component": "post" }
        }),
    );

    let item = record_to_list_item(&entry);
    assert_eq!(item.key, "blog/a");
    assert_eq!(item.name.as_deref(), Some("A"));
    assert_eq!(item.category.as_deref(), Some("post"));
    assert_eq!(item.published_at.as_deref(), Some("2024-03-01T10:30:00.000Z"));
}

#[test]
fn resolve_db_path_prefers_explicit_path() {
    let explicit = PathBuf::from("/tmp/explicit.db");
    assert_eq!(resolve_db_path(Some(explicit.clone())), explicit);
}

#[test]
fn read_push_input_reads_file_and_rejects_empty() {
    let workspace = Workspace::new();
    let path = workspace.write_payload("story.json", &json!({ "full_slug": "blog/a" }));
    assert_eq!(
        read_push_input(Some(path.as_path())).unwrap(),
        r#"{"full_slug":"blog/a"}"#
    );

    let empty = workspace.dir.path().join("empty.json");
    std::fs::write(&empty, "  \n").unwrap();
    assert!(matches!(
        read_push_input(Some(empty.as_path())),
        Err(CliError::EmptyInput)
    ));
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn push_replaces_record_in_place() {
    let workspace = Workspace::new();
    let first = workspace.write_payload(
        "first.json",
        &json!({ "story": { "full_slug": "blog/a", "name": "First" } }),
    );
    let second = workspace.write_payload(
        "second.json",
        &json!({ "story": { "full_slug": "blog/b", "name": "Second" } }),
    );
    let updated = workspace.write_payload(
        "updated.json",
        &json!({ "full_slug": "blog/a", "name": "First, updated" }),
    );

    for payload in [&first, &second, &updated] {
        run_push(
            "posts",
            Some(payload.as_path()),
            &workspace.config_path(),
            &workspace.db_path(),
        )
        .await
        .unwrap();
    }

    let entries = list_records("posts", 10, &workspace.db_path()).await.unwrap();
    let keys: Vec<&str> = entries.iter().map(|entry| entry.key.as_str()).collect();
    assert_eq!(keys, vec!["blog/a", "blog/b"]);
    assert_eq!(entries[0].record.get("name"), Some(&json!("First, updated")));

    let limited = list_records("posts", 1, &workspace.db_path()).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn push_rejects_unknown_collection_and_missing_identity() {
    let workspace = Workspace::new();
    let payload = workspace.write_payload("story.json", &json!({ "name": "no slug" }));

    let unknown = run_push(
        "missing",
        Some(payload.as_path()),
        &workspace.config_path(),
        &workspace.db_path(),
    )
    .await;
    assert!(matches!(unknown, Err(CliError::UnknownCollection(_))));

    let error = run_push(
        "posts",
        Some(payload.as_path()),
        &workspace.config_path(),
        &workspace.db_path(),
    )
    .await
    .unwrap_err();
    let message = error.to_string();
    assert!(message.contains("'posts'"));
    assert!(message.contains("full_slug"));
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn status_reports_each_configured_collection() {
    let workspace = Workspace::new();
    let payload = workspace.write_payload("story.json", &json!({ "full_slug": "blog/a" }));
    run_push(
        "posts",
        Some(payload.as_path()),
        &workspace.config_path(),
        &workspace.db_path(),
    )
    .await
    .unwrap();

    let config = SyncConfig::load_from_path(&workspace.config_path()).unwrap();
    let statuses = collect_statuses(&config, &workspace.db_path()).await.unwrap();

    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].name, "posts");
    assert_eq!(statuses[0].records, 1);
    assert_eq!(statuses[0].version, None);
    assert_eq!(statuses[1].records, 0);

    let lines = format_status_lines(&statuses);
    assert!(lines[0].contains("records=1"));
    assert!(lines[1].contains("version=-"));
}
