use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] storysync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
    #[error("No record provided; pass --file or pipe JSON on stdin")]
    EmptyInput,
    #[error("Invalid push payload: {0}")]
    InvalidPayload(String),
    #[error("{failed} of {total} collections failed to sync")]
    SyncFailed { failed: usize, total: usize },
}
