//! Prometheus implementation of the metrics provider.
//!
//! Lists the metric names a Prometheus server exposes via the label-values
//! API (`/api/v1/label/__name__/values`). Authentication is carried by the
//! HTTP client supplied per call.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use dashval_cache::{CacheError, MetricsProvider, MetricsResult};
use serde::Deserialize;
use tracing::debug;

/// Default recommended TTL for a fetched metric listing.
const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Response envelope of the Prometheus label-values API.
#[derive(Debug, Deserialize)]
struct LabelValuesResponse {
    status: String,
    #[serde(default)]
    data: Vec<String>,
}

/// Metrics provider for Prometheus datasources.
#[derive(Debug, Clone)]
pub struct PrometheusProvider {
    ttl: Duration,
}

impl PrometheusProvider {
    /// Creates a provider recommending the default 5-minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self { ttl: DEFAULT_TTL }
    }

    /// Overrides the recommended TTL. A zero TTL disables caching.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the TTL this provider recommends.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for PrometheusProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for PrometheusProvider {
    fn fetch_metrics<'a>(
        &'a self,
        datasource_uid: &'a str,
        datasource_url: &'a str,
        client: &'a reqwest::Client,
    ) -> Pin<Box<dyn Future<Output = dashval_cache::Result<MetricsResult>> + Send + 'a>> {
        Box::pin(async move {
            let endpoint = label_values_endpoint(datasource_url);
            debug!(uid = %datasource_uid, endpoint = %endpoint, "listing prometheus metrics");

            let response =
                client
                    .get(&endpoint)
                    .send()
                    .await
                    .map_err(|err| CacheError::Fetch {
                        datasource_url: datasource_url.to_string(),
                        reason: err.to_string(),
                    })?;

            let status = response.status();
            if !status.is_success() {
                return Err(CacheError::Fetch {
                    datasource_url: datasource_url.to_string(),
                    reason: format!("HTTP {status}"),
                });
            }

            let body: LabelValuesResponse =
                response.json().await.map_err(|err| CacheError::Fetch {
                    datasource_url: datasource_url.to_string(),
                    reason: format!("invalid label values response: {err}"),
                })?;

            let metrics = metric_names(body, datasource_url)?;
            Ok(MetricsResult::new(metrics, self.ttl))
        })
    }
}

/// Builds the label-values URL for the metric-name label.
fn label_values_endpoint(datasource_url: &str) -> String {
    format!(
        "{}/api/v1/label/__name__/values",
        datasource_url.trim_end_matches('/')
    )
}

/// Unwraps the response envelope, rejecting non-success API statuses.
fn metric_names(
    response: LabelValuesResponse,
    datasource_url: &str,
) -> dashval_cache::Result<Vec<String>> {
    if response.status != "success" {
        return Err(CacheError::Fetch {
            datasource_url: datasource_url.to_string(),
            reason: format!("prometheus API status was {:?}", response.status),
        });
    }
    Ok(response.data)
}
