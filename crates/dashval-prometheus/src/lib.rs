//! Prometheus metrics provider and query compatibility validation.
#![forbid(unsafe_code)]
//!
//! `dashval-prometheus` answers the question "will this dashboard work
//! against that Prometheus server?". It ships the [`PrometheusProvider`]
//! that lists a server's metric names through the shared cache, a lexical
//! [`PromqlMetricScanner`] that pulls metric names out of query text, and
//! the [`Validator`] that compares the two and reports a compatibility
//! score, overall and per query.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use dashval_cache::MetricsCache;
//! use dashval_prometheus::{Datasource, PrometheusProvider, Validator};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = MetricsCache::new();
//! cache.register_provider("prometheus", Arc::new(PrometheusProvider::new()))?;
//! let validator = Validator::new(cache);
//!
//! let datasource = Datasource {
//!     uid: "prom-uid".to_string(),
//!     ds_type: "prometheus".to_string(),
//!     name: "Prometheus".to_string(),
//!     url: "http://localhost:9090".to_string(),
//!     http_client: reqwest::Client::new(),
//! };
//!
//! let dashboard = serde_json::json!({"panels": []});
//! let report = validator.validate_dashboard(&dashboard, &datasource).await?;
//! println!("compatibility: {:.0}%", report.compatibility_score * 100.0);
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/dashval-prometheus/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod parser;
pub mod provider;
pub mod validator;

// Re-export main types at crate root
pub use error::{Result, ValidatorError};
pub use parser::{MetricExtractor, PromqlMetricScanner};
pub use provider::PrometheusProvider;
pub use validator::{Datasource, QueryResult, ValidationResult, Validator};
