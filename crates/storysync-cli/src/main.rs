//! storysync CLI - keep local collections in step with a Storyblok space
//!
//! Syncs configured collections into a local libSQL database, applies pushed
//! stories, and reports what is stored.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::{resolve_config_path, resolve_db_path};
use crate::commands::list::run_list;
use crate::commands::push::run_push;
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
use crate::error::CliError;

const DEFAULT_LOG_DIRECTIVES: &str = "storysync=info,storysync_core=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config);
    let db_path = resolve_db_path(cli.db_path);

    match cli.command {
        Commands::Sync { collections, full } => {
            run_sync(&collections, full, &config_path, &db_path).await?;
        }
        Commands::Push { collection, file } => {
            run_push(&collection, file.as_deref(), &config_path, &db_path).await?;
        }
        Commands::List {
            collection,
            limit,
            json,
        } => run_list(&collection, limit, json, &db_path).await?,
        Commands::Status { json } => run_status(json, &config_path, &db_path).await?,
    }

    Ok(())
}
