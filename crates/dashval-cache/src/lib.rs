//! TTL metrics cache with pluggable per-datasource providers.
#![forbid(unsafe_code)]
//!
//! `dashval-cache` deduplicates expensive metric-discovery calls made while
//! validating dashboards. Each datasource type registers a
//! [`MetricsProvider`] once at startup; the [`MetricsCache`] then answers
//! repeated lookups for the same datasource UID from memory until the
//! provider-supplied TTL expires.
//!
//! # Example
//!
//! ```rust
//! use std::future::Future;
//! use std::pin::Pin;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use dashval_cache::{MetricsCache, MetricsProvider, MetricsResult};
//!
//! struct StaticProvider;
//!
//! impl MetricsProvider for StaticProvider {
//!     fn fetch_metrics<'a>(
//!         &'a self,
//!         _uid: &'a str,
//!         _url: &'a str,
//!         _client: &'a reqwest::Client,
//!     ) -> Pin<Box<dyn Future<Output = dashval_cache::Result<MetricsResult>> + Send + 'a>> {
//!         Box::pin(async {
//!             Ok(MetricsResult::new(
//!                 vec!["up".to_string()],
//!                 Duration::from_secs(300),
//!             ))
//!         })
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> dashval_cache::Result<()> {
//! let cache = MetricsCache::new();
//! cache.register_provider("prometheus", Arc::new(StaticProvider))?;
//!
//! let client = reqwest::Client::new();
//! let metrics = cache
//!     .get_metrics("prometheus", "prom-uid", "http://localhost:9090", &client)
//!     .await?;
//! assert_eq!(metrics, vec!["up".to_string()]);
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/dashval-cache/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cache;
pub mod error;
pub mod provider;

// Re-export main types at crate root
pub use cache::MetricsCache;
pub use error::{CacheError, Result};
pub use provider::{MetricsProvider, MetricsResult};
