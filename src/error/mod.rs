//! Error handling for the view pipeline.

use std::io;
use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for loading, selection and transformation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A source file is missing, malformed or lacks an expected column
    #[error("Failed to load {}: {reason}", path.display())]
    DataLoad {
        /// The file that failed to load
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A control was set to a value outside its declared domain
    #[error("Invalid selection for control '{control}': {reason}")]
    InvalidSelection {
        /// The control identifier
        control: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A control identifier that was never registered
    #[error("Unknown control: {0}")]
    UnknownControl(String),

    /// A column is missing or has an unusable type
    #[error("Column '{column}': {reason}")]
    Column {
        /// The column name
        column: String,
        /// What is wrong with it
        reason: String,
    },

    /// Configuration could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from an Arrow compute kernel
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error converting between typed rows and record batches
    #[error("Row conversion error: {0}")]
    Rows(#[from] serde_arrow::Error),

    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error (de)serializing JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a data load error for a path
    pub fn data_load(path: &Path, reason: impl Into<String>) -> Self {
        Self::DataLoad {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create an invalid selection error for a control
    pub fn invalid_selection(control: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSelection {
            control: control.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a column error
    pub fn column(column: &str, reason: impl Into<String>) -> Self {
        Self::Column {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
