//! # Error Handling
//!
//! Pipeline-wide error taxonomy. Fatal classes (configuration, storage,
//! data-shape, uncaught collector failure) abort the run with exit code 1;
//! per-unit external API failures are handled inside collectors and never
//! surface here.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or invalid configuration; the message carries the full
    /// human-readable issue list.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Storage failure propagated out of a batch call.
    #[error("Storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),

    /// Corrupt persisted state encountered during import. Fail-fast rather
    /// than silently dropping contributor records.
    #[error("Malformed data in {path}: {message}")]
    DataShape { path: PathBuf, message: String },

    /// A collector's top-level scrape() failed. Per-unit failures are the
    /// collector's responsibility; anything escaping is fatal to the run.
    #[error("Collector '{name}' failed: {source}")]
    Collector {
        name: String,
        #[source]
        source: crate::collectors::CollectorError,
    },

    /// Another run holds the data-directory lock.
    #[error("Data directory {path} is locked by another run (remove {path}/.leaderboard.lock if stale)")]
    Locked { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// Process exit code for this error. Every fatal error exits 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
