//! Error types for the view layer

use thiserror::Error;

/// Errors raised while exporting or rendering views
#[derive(Debug, Error)]
pub enum ViewError {
    /// CSV encoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing the export failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Export target is not usable
    #[error("Invalid export target {path}: {reason}")]
    InvalidTarget {
        /// Offending path
        path: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Result alias for the view layer
pub type Result<T> = std::result::Result<T, ViewError>;
