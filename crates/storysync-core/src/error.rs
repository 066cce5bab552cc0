//! Error types for storysync-core

use thiserror::Error;

/// Result type alias using storysync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in storysync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote content API returned an error response
    #[error("Content API error: {0}")]
    Api(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The current space version could not be retrieved
    #[error("Space version unavailable: {0}")]
    VersionUnavailable(String),

    /// A sync pass failed for a collection
    #[error("Sync of collection '{collection}' failed: {source}")]
    Sync {
        collection: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an error with the collection it was raised for.
    pub fn in_collection(self, collection: &str) -> Self {
        match self {
            Self::Sync { .. } => self,
            other => Self::Sync {
                collection: collection.to_string(),
                source: Box::new(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_error_message_names_collection_and_cause() {
        let error = Error::Api("Unauthorized (401)".to_string()).in_collection("posts");
        let message = error.to_string();
        assert!(message.contains("'posts'"));
        assert!(message.contains("Unauthorized (401)"));
    }

    #[test]
    fn in_collection_does_not_double_wrap() {
        let error = Error::Api("boom".to_string())
            .in_collection("posts")
            .in_collection("other");
        assert!(matches!(error, Error::Sync { ref collection, .. } if collection == "posts"));
    }
}
