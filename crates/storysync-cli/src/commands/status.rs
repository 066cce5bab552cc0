use std::path::Path;

use crate::commands::common::{collect_statuses, format_status_lines, load_config};
use crate::error::CliError;

pub async fn run_status(as_json: bool, config_path: &Path, db_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let statuses = collect_statuses(&config, db_path).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    if statuses.is_empty() {
        println!("No collections configured.");
        return Ok(());
    }

    for line in format_status_lines(&statuses) {
        println!("{line}");
    }
    Ok(())
}
