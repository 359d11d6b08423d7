//! Error types for the benchmark engine.
//!
//! Per-item failures (a tool failing on one document, a table id with no
//! extracted counterpart, a malformed cell grid) are recorded as data on the
//! corresponding result objects and never surface as `Err`. Only manifest
//! load/save and configuration validation propagate errors to the caller,
//! since there is no safe partial state to return for those.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for benchmark engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during manifest handling and benchmark setup.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing/encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Manifest validation error
    #[error("Invalid manifest at {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    /// Manifest file not found
    #[error("Manifest file not found: {0}")]
    ManifestNotFound(PathBuf),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Benchmark execution error
    #[error("Benchmark error: {0}")]
    Benchmark(String),
}
