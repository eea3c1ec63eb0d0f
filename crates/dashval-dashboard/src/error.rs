//! Error types for the dashval-dashboard crate.

use thiserror::Error;

/// Errors that can occur while extracting queries from a dashboard.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The dashboard is not a recognized v1 structure.
    ///
    /// Raised when the document carries v2 markers (`elements`/`layout`) or
    /// lacks a top-level `panels` array. Malformed individual panels or
    /// targets never raise this; they are skipped instead.
    #[error("unsupported dashboard format: {reason}")]
    UnsupportedFormat {
        /// Why the document was rejected.
        reason: String,
    },
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
