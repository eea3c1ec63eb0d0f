//! Error types for the dashval-cache crate.

use thiserror::Error;

/// Errors that can occur in the metrics cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No provider is registered for the requested datasource type.
    ///
    /// This signals a misconfiguration: the validator for this datasource
    /// type was never wired up during startup.
    #[error("no metrics provider registered for datasource type: {ds_type}")]
    NoProvider {
        /// The datasource type that has no registered provider.
        ds_type: String,
    },

    /// A provider is already registered for the datasource type.
    ///
    /// Registration happens once during initialization; a second registration
    /// for the same type is a startup configuration bug.
    #[error("metrics provider already registered for datasource type: {ds_type}")]
    DuplicateProvider {
        /// The datasource type that was registered twice.
        ds_type: String,
    },

    /// The upstream metric fetch failed (network, parse, or a non-success
    /// response from the remote API).
    #[error("failed to fetch metrics from {datasource_url}: {reason}")]
    Fetch {
        /// URL of the datasource that failed.
        datasource_url: String,
        /// The reason the fetch failed.
        reason: String,
    },
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
