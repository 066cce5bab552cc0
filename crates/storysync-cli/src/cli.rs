use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "storysync")]
#[command(about = "Keep local collections in step with a Storyblok space")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the sync config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sync configured collections from the remote space
    Sync {
        /// Only sync these collections (repeatable)
        #[arg(short, long = "collection", value_name = "NAME")]
        collections: Vec<String>,
        /// Clear and re-fetch everything, even when the space is unchanged
        #[arg(long)]
        full: bool,
    },
    /// Write a single story into a collection without fetching
    Push {
        /// Target collection name
        collection: String,
        /// JSON payload file (stdin when omitted)
        #[arg(short, long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// List stored records of a collection
    List {
        /// Collection name
        collection: String,
        /// Number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show record counts, version tokens and watermarks
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
