//! Record store error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open record store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("record store query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to serialize record: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A stored row whose JSON no longer parses.
    #[error("stored record {id} is corrupt: {source}")]
    Corrupt {
        id: i64,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored record {id} is not a JSON object")]
    NotAnObject { id: i64 },
}

pub type Result<T> = std::result::Result<T, StoreError>;
