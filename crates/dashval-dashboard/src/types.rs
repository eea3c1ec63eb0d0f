//! Core data types for extracted dashboard queries.

use serde::{Deserialize, Serialize};

/// A single query extracted from one panel target.
///
/// Immutable value carrying everything the compatibility validator needs to
/// report on the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// The target's reference ID within its panel (e.g. "A").
    pub ref_id: String,
    /// The raw query text (PromQL, SQL, ... depending on the datasource).
    pub query_text: String,
    /// Title of the panel the query belongs to.
    pub panel_title: String,
    /// Numeric ID of the panel the query belongs to.
    pub panel_id: i64,
}

/// A [`Query`] together with its originating datasource reference.
///
/// The datasource UID here may still be a template-variable reference such
/// as `${DS_PROMETHEUS}`; grouping resolves it to a concrete UID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardQuery {
    /// The extracted query.
    pub query: Query,
    /// The possibly-unresolved datasource UID string.
    pub datasource_uid: String,
}
