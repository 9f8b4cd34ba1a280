use std::path::PathBuf;
use thiserror::Error;

/// Failures of the underlying key-value slot backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error("write rejected for slot '{key}': {reason}")]
    Rejected { key: String, reason: String },
}

/// Errors surfaced by the entry store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence failed: {0}")]
    Persistence(#[from] StorageError),

    #[error("invalid import document: {0}")]
    ImportFormat(String),

    #[error("failed to serialize entries: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
