// src/error.rs

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, ClusteringError>;

/// Errors raised at the edges of the clustering pipeline.
///
/// The merge algorithm itself cannot fail once records and parameters have
/// been validated, so every variant here belongs to ingestion, configuration
/// or persistence.
#[derive(Debug, Error)]
pub enum ClusteringError {
    /// A record did not have the `{tags}` shape the core expects.
    #[error("invalid record at row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    /// A clustering parameter was outside its allowed range.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClusteringError {
    pub fn invalid_record(row: usize, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            row,
            reason: reason.into(),
        }
    }

    pub fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}
