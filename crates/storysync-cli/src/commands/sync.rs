use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use storysync_core::db::{LibSqlMetadataStore, LibSqlRecordStore};
use storysync_core::{CollectionConfig, ContentVersion, SyncJob, SyncMode, Synchronizer};

use crate::commands::common::{
    build_client, format_outcome, load_config, open_database, select_collections,
};
use crate::error::CliError;

pub async fn run_sync(
    names: &[String],
    full: bool,
    config_path: &Path,
    db_path: &Path,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let selected = select_collections(&config, names)?;
    if selected.is_empty() {
        println!("No collections configured.");
        return Ok(());
    }

    let synchronizer = Synchronizer::new(Arc::new(build_client(&config)?));
    let db = open_database(db_path).await?;
    let conn = db.connection();

    let runs = selected.iter().map(|collection| {
        let synchronizer = synchronizer.clone();
        let job = build_job(collection, config.version, full);

        async move {
            let store = LibSqlRecordStore::new(conn, job.collection.as_str());
            let meta = LibSqlMetadataStore::new(conn, job.collection.as_str());
            let result = synchronizer.sync(&job, &store, &meta, None).await;
            (job.collection, result)
        }
    });

    let results = join_all(runs).await;
    let total = results.len();
    let mut failed = 0;

    for (collection, result) in results {
        match result {
            Ok(outcome) => println!("{}", format_outcome(&collection, &outcome)),
            Err(error) => {
                failed += 1;
                eprintln!("{error}");
            }
        }
    }

    if failed > 0 {
        return Err(CliError::SyncFailed { failed, total });
    }
    Ok(())
}

/// Job for one collection; `full` clears it and bypasses the version gate
pub fn build_job(collection: &CollectionConfig, version: ContentVersion, full: bool) -> SyncJob {
    let mut job = collection.to_job(version, None);
    if full {
        job.mode = SyncMode::Full;
        job.force = true;
    }
    job
}
