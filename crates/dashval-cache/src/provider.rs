//! The per-datasource metrics provider trait.
//!
//! A [`MetricsProvider`] is the strategy object for one datasource type
//! (e.g. "prometheus"). It owns the wire protocol for listing the metric
//! names a live datasource exposes, and recommends how long the result may
//! be cached.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::Result;

/// The outcome of a successful provider fetch.
#[derive(Debug, Clone)]
pub struct MetricsResult {
    /// Metric names available on the datasource, in the order the
    /// datasource reported them.
    pub metrics: Vec<String>,
    /// How long the result may be cached. A zero duration means the result
    /// must not be cached and every call will re-fetch.
    pub ttl: Duration,
}

impl MetricsResult {
    /// Creates a result with the given metrics and TTL.
    #[must_use]
    pub fn new(metrics: Vec<String>, ttl: Duration) -> Self {
        Self { metrics, ttl }
    }
}

/// Strategy trait for fetching the available metric names of one datasource
/// type.
///
/// Implementations own their wire protocol and TTL policy. Authentication is
/// carried by the supplied pre-configured HTTP client. Cancellation follows
/// the usual future semantics: dropping the returned future aborts the fetch.
///
/// Providers are registered once per datasource type at startup and must be
/// stateless or internally thread-safe.
pub trait MetricsProvider: Send + Sync {
    /// Fetches the list of metric names from a live datasource.
    ///
    /// # Errors
    ///
    /// Returns an error if the datasource cannot be reached or returns an
    /// unusable response.
    fn fetch_metrics<'a>(
        &'a self,
        datasource_uid: &'a str,
        datasource_url: &'a str,
        client: &'a reqwest::Client,
    ) -> Pin<Box<dyn Future<Output = Result<MetricsResult>> + Send + 'a>>;
}
