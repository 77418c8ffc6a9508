//! Error types for fieldlog-store.

use std::path::PathBuf;

/// Result type for fieldlog-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fieldlog-store.
///
/// The `Probe`, `Read`, and `Write` variants name the append pipeline step
/// that failed; earlier steps are never rolled back.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The existence check on the log file failed.
    #[error("failed to probe log file {path}: {source}")]
    Probe {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Reading the existing log content failed.
    #[error("failed to read log file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing the log file failed.
    #[error("failed to write log file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to create the log directory.
    #[error("failed to create log directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stored line could not be parsed back into a sample.
    #[error("malformed record at line {line}: {source}")]
    Malformed {
        line: usize,
        source: fieldlog_types::ParseError,
    },

    /// Export was requested before any record was written.
    #[error("nothing to export: log file does not exist")]
    NoExportTarget,

    /// The export sink rejected the log file.
    #[error("export failed: {0}")]
    Export(#[source] std::io::Error),
}
