//! TTL-expiring metrics cache with a provider registry.
//!
//! This module provides the [`MetricsCache`] which deduplicates expensive
//! metric-discovery calls per datasource. Results are keyed by datasource UID
//! and expire after the TTL recommended by the provider that produced them.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{CacheError, Result};
use crate::provider::MetricsProvider;

/// How often the background cleanup loop sweeps expired entries.
const SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// A cached metric list with its absolute expiry.
#[derive(Debug, Clone)]
struct CacheEntry {
    metrics: Vec<String>,
    expires_at: Instant,
}

/// Shared state behind the lock.
///
/// One lock guards both maps: entry reads take the shared mode, while
/// registration, stores and the cleanup sweep take the exclusive mode.
#[derive(Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    providers: HashMap<String, Arc<dyn MetricsProvider>>,
}

/// Thread-safe read-through cache of datasource metric listings.
///
/// On a miss (or an expired entry) the cache delegates to the
/// [`MetricsProvider`] registered for the datasource type, stores the result
/// under the datasource UID with the provider-supplied TTL, and returns the
/// metric list. Provider fetches run outside the internal lock so slow
/// datasources cannot serialize other readers.
///
/// Concurrent misses for the same UID each invoke the provider independently;
/// the last store wins. There is no single-flight deduplication.
pub struct MetricsCache {
    sweep_interval: Duration,
    inner: Arc<RwLock<Inner>>,
}

impl std::fmt::Debug for MetricsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("MetricsCache")
            .field("sweep_interval", &self.sweep_interval)
            .field("entries", &inner.entries.len())
            .field("providers", &inner.providers.len())
            .finish_non_exhaustive()
    }
}

impl MetricsCache {
    /// Creates an empty cache with the default cleanup interval.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sweep_interval: SWEEP_INTERVAL,
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Overrides the cleanup sweep interval.
    ///
    /// Intended for tests; production callers should keep the default.
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Registers the provider for a datasource type.
    ///
    /// Registration is part of process initialization and must complete
    /// before concurrent readers start.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::DuplicateProvider`] if a provider is already
    /// registered for `ds_type`. This is a startup configuration bug and
    /// should abort initialization.
    pub fn register_provider(
        &self,
        ds_type: impl Into<String>,
        provider: Arc<dyn MetricsProvider>,
    ) -> Result<()> {
        let ds_type = ds_type.into();
        let mut inner = self.inner.write();
        if inner.providers.contains_key(&ds_type) {
            return Err(CacheError::DuplicateProvider { ds_type });
        }
        info!(ds_type = %ds_type, "registered metrics provider");
        inner.providers.insert(ds_type, provider);
        Ok(())
    }

    /// Returns the metric names for a datasource, fetching through the
    /// registered provider on a miss.
    ///
    /// The fast path is a shared-lock map lookup; a fresh entry is returned
    /// without touching the provider. On a miss or an expired entry the
    /// provider fetch runs unlocked, and a successful result with a non-zero
    /// TTL is stored (overwriting any stale entry for the UID). A zero TTL
    /// means the result is returned but never cached.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NoProvider`] if no provider is registered for
    /// `ds_type`, or the provider's error unchanged if the fetch fails.
    /// Failed fetches are not cached and not retried here; the next call for
    /// the same UID will attempt the provider again.
    pub async fn get_metrics(
        &self,
        ds_type: &str,
        datasource_uid: &str,
        datasource_url: &str,
        client: &reqwest::Client,
    ) -> Result<Vec<String>> {
        // The guard must drop before the await below.
        let provider = {
            let inner = self.inner.read();
            if let Some(entry) = inner.entries.get(datasource_uid) {
                if Instant::now() < entry.expires_at {
                    debug!(uid = %datasource_uid, "metrics cache hit");
                    return Ok(entry.metrics.clone());
                }
            }
            inner.providers.get(ds_type).map(Arc::clone)
        };

        let Some(provider) = provider else {
            return Err(CacheError::NoProvider {
                ds_type: ds_type.to_string(),
            });
        };

        debug!(
            uid = %datasource_uid,
            ds_type = %ds_type,
            "metrics cache miss, fetching from provider"
        );
        let result = provider
            .fetch_metrics(datasource_uid, datasource_url, client)
            .await?;

        if !result.ttl.is_zero() {
            let mut inner = self.inner.write();
            inner.entries.insert(
                datasource_uid.to_string(),
                CacheEntry {
                    metrics: result.metrics.clone(),
                    expires_at: Instant::now() + result.ttl,
                },
            );
            debug!(
                uid = %datasource_uid,
                metrics_count = result.metrics.len(),
                ttl_secs = result.ttl.as_secs(),
                "stored metrics in cache"
            );
        }

        Ok(result.metrics)
    }

    /// Removes every entry whose expiry has passed.
    ///
    /// The background loop calls this on each tick; it can also be called
    /// manually to free memory early.
    pub fn sweep_expired(&self) {
        let now = Instant::now();
        let mut inner = self.inner.write();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| entry.expires_at > now);
        let removed = before - inner.entries.len();
        if removed > 0 {
            debug!(removed, "swept expired metrics cache entries");
        }
    }

    /// Runs the background cleanup loop until `shutdown` resolves.
    ///
    /// Sweeps expired entries on a fixed interval. Returns promptly once the
    /// shutdown future completes.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let mut interval = tokio::time::interval(self.sweep_interval);
        tokio::pin!(shutdown);

        info!(
            interval_secs = self.sweep_interval.as_secs(),
            "metrics cache cleanup loop started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => self.sweep_expired(),
                () = &mut shutdown => {
                    info!("metrics cache cleanup loop stopped");
                    return;
                }
            }
        }
    }

    /// Returns the number of live cache entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        let inner = self.inner.read();
        inner.entries.len()
    }

    /// Returns whether an entry (fresh or expired) exists for the UID.
    #[must_use]
    pub fn has_entry(&self, datasource_uid: &str) -> bool {
        let inner = self.inner.read();
        inner.entries.contains_key(datasource_uid)
    }
}

impl Clone for MetricsCache {
    fn clone(&self) -> Self {
        Self {
            sweep_interval: self.sweep_interval,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for MetricsCache {
    fn default() -> Self {
        Self::new()
    }
}
