use std::path::Path;

use storysync_core::db::LibSqlRecordStore;
use storysync_core::sync::push_record;

use crate::commands::common::{
    format_outcome, load_config, open_database, parse_pushed_record, read_push_input,
};
use crate::error::CliError;

pub async fn run_push(
    name: &str,
    file: Option<&Path>,
    config_path: &Path,
    db_path: &Path,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let collection = config
        .collection(name.trim())
        .ok_or_else(|| CliError::UnknownCollection(name.to_string()))?;
    let record = parse_pushed_record(&read_push_input(file)?)?;

    let job = collection.to_job(config.version, None);
    let db = open_database(db_path).await?;
    let store = LibSqlRecordStore::new(db.connection(), job.collection.as_str());
    let outcome = push_record(&job, &store, record)
        .await
        .map_err(|error| error.in_collection(&job.collection))?;

    println!("{}", format_outcome(&job.collection, &outcome));
    Ok(())
}
