//! Error types for catalog loading.

use std::path::PathBuf;

/// Errors that can occur when reading a catalog table.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The table file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// Path of the table.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The table is not a JSON array.
    #[error("failed to parse catalog {path}: {source}")]
    Json {
        /// Path of the table.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}
