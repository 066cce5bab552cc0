use std::path::Path;

use crate::commands::common::{
    format_record_lines, list_records, record_to_list_item, RecordListItem,
};
use crate::error::CliError;

pub async fn run_list(
    collection: &str,
    limit: usize,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let entries = list_records(collection, limit, db_path).await?;

    if as_json {
        let json_items = entries
            .iter()
            .map(record_to_list_item)
            .collect::<Vec<RecordListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No records stored for '{collection}'.");
        return Ok(());
    }

    for line in format_record_lines(&entries) {
        println!("{line}");
    }
    Ok(())
}
