//! Error types for the dashval-prometheus crate.

use dashval_cache::CacheError;
use dashval_dashboard::ExtractError;
use thiserror::Error;

/// Errors that can occur while validating dashboard queries.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// The available-metric listing could not be fetched through the cache.
    ///
    /// Aborts the whole compatibility check for the datasource; no partial
    /// score is produced.
    #[error("failed to fetch metrics from {datasource_name}: {source}")]
    MetricsFetch {
        /// Display name of the datasource that failed.
        datasource_name: String,
        /// The underlying cache or provider error.
        #[source]
        source: CacheError,
    },

    /// The dashboard document could not be processed at all.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// A query could not be scanned for metric names.
    ///
    /// Raised by the metric extractor; per-query validation records it in
    /// the breakdown instead of failing the whole check.
    #[error("invalid PromQL query: {reason}")]
    QueryParse {
        /// Why the query text could not be scanned.
        reason: String,
    },
}

/// Result type for validation operations.
pub type Result<T> = std::result::Result<T, ValidatorError>;
