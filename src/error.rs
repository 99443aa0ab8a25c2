// Error types for whole-resource failures
//
// Per-row problems never surface as errors; only a workbook that cannot be
// read or decoded at all ends up here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read workbook {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON workbook {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid CSV sheet {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid spreadsheet {path}: {source}")]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("unexpected workbook layout in {path}: {message}")]
    Layout { path: PathBuf, message: String },
}

impl LoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Json { path, .. }
            | LoadError::Csv { path, .. }
            | LoadError::Spreadsheet { path, .. }
            | LoadError::Layout { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
