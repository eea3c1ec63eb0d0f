//! Query extraction and grouping from dashboard JSON.
//!
//! A dashboard is an untyped JSON tree supplied by an external system; no
//! field beyond the documented ones is assumed to exist. Extraction walks
//! the v1 `panels` array, pulls each target's query text and datasource
//! reference, resolves template-variable datasources, and groups the
//! resulting queries by concrete datasource UID.
//!
//! Only structural problems (a v2 document, no `panels` array) fail the
//! operation. Malformed individual panels and targets are skipped.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ExtractError, Result};
use crate::types::{DashboardQuery, Query};
use crate::variables::resolve_datasource_uid;

/// Query-text fields probed in priority order. Datasource plugins use
/// different field names for the same concept.
const QUERY_TEXT_FIELDS: &[&str] = &[
    "expr",
    "query",
    "rawSql",
    "rawQuery",
    "target",
    "measurement",
];

/// Extracts every panel query from a v1 dashboard and groups the queries by
/// resolved datasource UID.
///
/// Template-variable datasource references that resolve to a Prometheus
/// datasource are collapsed to `single_datasource_uid`; unresolved variables
/// keep their literal text as the group key (no datasource will match them).
/// Insertion order is preserved within each group.
///
/// This is a pure function over the document: no shared state, identical
/// inputs produce identical groupings.
///
/// # Errors
///
/// Returns [`ExtractError::UnsupportedFormat`] if the document carries v2
/// markers (`elements`/`layout`) or has no top-level `panels` array.
pub fn extract_and_group(
    dashboard: &Value,
    single_datasource_uid: &str,
) -> Result<HashMap<String, Vec<Query>>> {
    let panels = v1_panels(dashboard)?;

    let mut extracted = Vec::new();
    for panel in panels {
        let Some(panel) = panel.as_object() else {
            continue;
        };
        collect_panel_targets(panel, &mut extracted);

        // Collapsed rows nest their panels one level down. One level is all
        // the schema produces; no deeper recursion is attempted.
        if let Some(nested) = panel.get("panels").and_then(Value::as_array) {
            for sub_panel in nested {
                if let Some(sub_panel) = sub_panel.as_object() {
                    collect_panel_targets(sub_panel, &mut extracted);
                }
            }
        }
    }

    let mut groups: HashMap<String, Vec<Query>> = HashMap::new();
    for dashboard_query in extracted {
        let resolved = resolve_datasource_uid(
            &dashboard_query.datasource_uid,
            single_datasource_uid,
            dashboard,
        );
        groups.entry(resolved).or_default().push(dashboard_query.query);
    }

    debug!(
        groups = groups.len(),
        queries = groups.values().map(Vec::len).sum::<usize>(),
        "extracted dashboard queries"
    );
    Ok(groups)
}

/// Returns the v1 `panels` array, rejecting v2 documents.
///
/// A dashboard is v1 iff it has a `panels` array and lacks both an
/// `elements` map and a `layout` field. `elements`/`layout` presence marks
/// the v2 schema even when panels-shaped data is also present.
fn v1_panels(dashboard: &Value) -> Result<&Vec<Value>> {
    let has_elements = dashboard.get("elements").is_some_and(Value::is_object);
    let has_layout = dashboard.get("layout").is_some();
    if has_elements || has_layout {
        return Err(ExtractError::UnsupportedFormat {
            reason: "dashboard uses the v2 schema (elements/layout)".to_string(),
        });
    }

    dashboard
        .get("panels")
        .and_then(Value::as_array)
        .ok_or_else(|| ExtractError::UnsupportedFormat {
            reason: "missing top-level panels array".to_string(),
        })
}

/// Extracts every usable target of one panel into `out`.
fn collect_panel_targets(panel: &Map<String, Value>, out: &mut Vec<DashboardQuery>) {
    let Some(targets) = panel.get("targets").and_then(Value::as_array) else {
        return;
    };

    let panel_title = panel.get("title").and_then(Value::as_str).unwrap_or_default();
    let panel_id = panel.get("id").and_then(Value::as_i64).unwrap_or_default();
    let panel_datasource = panel.get("datasource").and_then(datasource_uid_of);

    for target in targets {
        let Some(target) = target.as_object() else {
            continue;
        };

        // Target-level datasource wins; fall back to the panel's.
        let uid = target
            .get("datasource")
            .and_then(datasource_uid_of)
            .or_else(|| panel_datasource.clone());
        let Some(uid) = uid else {
            debug!(panel = %panel_title, "skipping target with no resolvable datasource");
            continue;
        };

        let Some(query_text) = query_text_of(target) else {
            debug!(panel = %panel_title, "skipping target with no query text");
            continue;
        };

        let ref_id = target.get("refId").and_then(Value::as_str).unwrap_or_default();
        out.push(DashboardQuery {
            query: Query {
                ref_id: ref_id.to_string(),
                query_text: query_text.to_string(),
                panel_title: panel_title.to_string(),
                panel_id,
            },
            datasource_uid: uid,
        });
    }
}

/// Reads a datasource UID from a bare string or a `{uid, type}` object.
fn datasource_uid_of(datasource: &Value) -> Option<String> {
    let uid = match datasource {
        Value::String(uid) => uid.as_str(),
        Value::Object(obj) => obj.get("uid").and_then(Value::as_str)?,
        _ => return None,
    };
    if uid.is_empty() {
        return None;
    }
    Some(uid.to_string())
}

/// Returns the first non-empty query-text field of a target.
fn query_text_of(target: &Map<String, Value>) -> Option<&str> {
    QUERY_TEXT_FIELDS.iter().find_map(|field| {
        target
            .get(*field)
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
    })
}
