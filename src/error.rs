//! Error handling utilities shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T, E = NbError> = std::result::Result<T, E>;

/// Domain-specific error describing failures during configuration, IO, or model handling.
#[derive(Debug, Error)]
pub enum NbError {
    /// Tokenizer or trainer configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Filesystem IO error with optional context path.
    #[error("io error while processing {path:?}: {source}")]
    Io {
        /// Underlying IO error returned by the standard library.
        source: std::io::Error,
        /// Target path associated with the IO failure if available.
        path: Option<PathBuf>,
    },
    /// Tabular input lacks one or more required columns.
    #[error("{path:?} is missing required column(s): {}", .columns.join(", "))]
    MissingColumns {
        /// File whose header was inspected.
        path: PathBuf,
        /// Required column names that were not found.
        columns: Vec<String>,
    },
    /// Error bubbled up from the `csv` crate while reading or writing records.
    #[error("csv error: {0}")]
    Csv(String),
    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// A persisted model violates the invariants of a trained classifier.
    #[error("invalid model: {0}")]
    InvalidModel(String),
    /// An operation that needs at least one record received none.
    #[error("empty dataset: {0}")]
    EmptyDataset(String),
}

impl From<serde_json::Error> for NbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<csv::Error> for NbError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

impl NbError {
    /// Helper constructor that attaches an optional path when wrapping IO errors.
    pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { source, path }
    }
}
