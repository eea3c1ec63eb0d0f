//! Dashboard query extraction and template-variable resolution.
#![forbid(unsafe_code)]
//!
//! `dashval-dashboard` turns an untyped v1 dashboard JSON document into
//! queries grouped by concrete datasource UID. Template-variable datasource
//! references (`$ds`, `${ds}`, `[[ds]]`) are resolved against the
//! dashboard's `__inputs` metadata, falling back to the single configured
//! datasource when that metadata is absent.
//!
//! All functions here are pure and stateless; they are safe to call from any
//! number of concurrent callers.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//!
//! let dashboard = json!({
//!     "panels": [{
//!         "id": 1,
//!         "title": "CPU",
//!         "targets": [{
//!             "datasource": {"type": "prometheus", "uid": "ds1"},
//!             "expr": "up",
//!             "refId": "A"
//!         }]
//!     }]
//! });
//!
//! let groups = dashval_dashboard::extract_and_group(&dashboard, "ds1").unwrap();
//! assert_eq!(groups["ds1"][0].query_text, "up");
//! ```

#![doc(html_root_url = "https://docs.rs/dashval-dashboard/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod extract;
pub mod types;
pub mod variables;

// Re-export main types at crate root
pub use error::{ExtractError, Result};
pub use extract::extract_and_group;
pub use types::{DashboardQuery, Query};
pub use variables::{
    extract_variable_name, is_prometheus_variable, is_variable_reference, resolve_datasource_uid,
};
