//! Error types
//!
//! `CmiError` covers failures that end a run. Row-local problems (dates,
//! places, authority lookups) have their own error types and are logged
//! and degraded by the converter instead of being propagated.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CmiError {
    /// Input table does not exist
    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),
    /// Output file could not be written
    #[error("Could not save {}: {source}", path.display())]
    OutputNotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Table lacks a column the conversion cannot do without
    #[error("No {0} field in table")]
    MissingColumn(&'static str),
    /// Extra delimiter given as more than one character
    #[error("Delimiter has to be a single character, got {0:?}")]
    InvalidDelimiter(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CmiError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            CmiError::InputNotFound(_) => 2,
            CmiError::OutputNotWritable { .. } => 3,
            _ => 1,
        }
    }
}
