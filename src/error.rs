// src/error.rs

use std::path::PathBuf;

/// Failures that make a single data file unloadable.
///
/// Everything else (I/O, store errors) travels as `anyhow::Error` with
/// context attached; these variants are the ones callers match on.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unknown dataset type `{0}`")]
    UnknownDataset(String),

    #[error("unknown region `{0}`")]
    UnknownRegion(String),

    #[error("malformed data file name `{name}`: {reason}")]
    MalformedFileName { name: String, reason: String },

    #[error("`{dataset}` has no column(s) named {columns:?}")]
    UnknownColumns {
        dataset: String,
        columns: Vec<String>,
    },

    #[error("`{dataset}` file repeats column(s) {columns:?}")]
    DuplicateColumns {
        dataset: String,
        columns: Vec<String>,
    },

    #[error("`{dataset}` file has no `{column}` column")]
    MissingPrimaryKey { dataset: String, column: String },

    #[error("{failures} cell(s) failed to clean in {path:?}; first: {first}")]
    CleaningFailed {
        path: PathBuf,
        failures: usize,
        first: String,
    },
}
