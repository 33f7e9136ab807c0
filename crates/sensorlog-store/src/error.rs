use sensorlog_core::IngestError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening the database or seeding it.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid equipment json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid sensor csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("unsupported database uri '{0}' (expected sqlite://...)")]
    UnsupportedUri(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}
