//! Error types for catalog resolution, table loading and geometry parsing.
//!
//! None of these are fatal to a viewer session. Loaders return them so the
//! caller can decide; the composer turns them into placeholder panels or
//! skipped layers with a structured warning.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::MapSelection;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// No catalog row matches the selection.
    #[error("no map in catalog for selection {selection}")]
    NotFound { selection: MapSelection },

    /// A file referenced by a catalog or configuration does not exist.
    #[error("file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// A row could not be turned into a typed record.
    #[error("malformed row {row} in {}: {reason}", path.display())]
    MalformedRow {
        path: PathBuf,
        row: usize,
        reason: String,
    },

    /// A required column is absent from a table header.
    #[error("missing column '{column}' in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Surface grid could not be decoded.
    #[error("invalid surface file {}: {reason}", path.display())]
    Surface { path: PathBuf, reason: String },

    #[error("invalid interval '{0}'")]
    InvalidInterval(String),

    /// A required input path is absent from the configuration.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl ViewerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::MissingFile { path }
        } else {
            Self::Io { path, source }
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
