//! Template-variable recognition and datasource resolution.
//!
//! Dashboards reference datasources through template variables in three
//! syntaxes: `${name}` (with optional `.fieldPath` or `:format` modifier),
//! `$name`, and `[[name]]` / `[[name:format]]`. This module recognizes the
//! syntaxes, extracts the bound variable name, and resolves Prometheus
//! datasource variables to a concrete UID.
//!
//! Variable names are ASCII word characters only (letters, digits,
//! underscore). Hyphens are not word characters, so `$ds-name` is a literal
//! string, not a variable reference.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// `${name}`, `${name.fieldPath}`, `${name:format}`. A dot or colon ends the
/// captured name; the modifier text is ignored.
static BRACES_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$\{([0-9A-Za-z_]+)(?:[.:][^}]*)?\}$").unwrap_or_else(|_| unreachable!())
});

/// `$name` with no modifiers. Anchoring rejects `${...}` here since `{` is
/// not a word character.
static BARE_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$([0-9A-Za-z_]+)$").unwrap_or_else(|_| unreachable!()));

/// `[[name]]` or `[[name:format]]`. A colon ends the captured name.
static BRACKETS_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[\[([0-9A-Za-z_]+)(?::[^\]]*)?\]\]$").unwrap_or_else(|_| unreachable!())
});

/// Extracts the variable name from a template-variable reference.
///
/// The three syntaxes are tried in precedence order: braces, bare dollar,
/// double brackets. Returns `None` if `reference` matches none of them.
#[must_use]
pub fn extract_variable_name(reference: &str) -> Option<&str> {
    for pattern in [&BRACES_VAR, &BARE_VAR, &BRACKETS_VAR] {
        if let Some(caps) = pattern.captures(reference) {
            return caps.get(1).map(|m| m.as_str());
        }
    }
    None
}

/// Returns whether the string is a recognized template-variable reference.
#[must_use]
pub fn is_variable_reference(reference: &str) -> bool {
    extract_variable_name(reference).is_some()
}

/// Returns whether a variable reference names a Prometheus datasource input.
///
/// Consults the dashboard's `__inputs` array: an input matches when the
/// lower-cased variable name contains the lower-cased input name, and that
/// input has `type == "datasource"` and `pluginId == "prometheus"`.
///
/// Dashboards with no `__inputs` array default to `true`. This is the MVP
/// single-datasource fallback: exported metadata is often stripped, and the
/// validator targets exactly one Prometheus datasource. It can misclassify
/// variables on multi-datasource dashboards.
#[must_use]
pub fn is_prometheus_variable(reference: &str, dashboard: &Value) -> bool {
    let Some(inputs) = dashboard.get("__inputs").and_then(Value::as_array) else {
        return true;
    };

    let Some(name) = extract_variable_name(reference) else {
        return false;
    };
    let name = name.to_ascii_lowercase();

    for input in inputs {
        let Some(input_name) = input.get("name").and_then(Value::as_str) else {
            continue;
        };
        let input_name = input_name.to_ascii_lowercase();
        if input_name.is_empty() || !name.contains(&input_name) {
            continue;
        }
        let is_datasource = input.get("type").and_then(Value::as_str) == Some("datasource");
        let is_prometheus = input.get("pluginId").and_then(Value::as_str) == Some("prometheus");
        if is_datasource && is_prometheus {
            return true;
        }
    }

    false
}

/// Resolves a datasource UID that may be a template-variable reference.
///
/// Non-variable strings are returned unchanged. A variable that
/// [`is_prometheus_variable`] resolves to `single_datasource_uid`; any other
/// variable is returned as its literal text, effectively un-grouped.
#[must_use]
pub fn resolve_datasource_uid(
    uid: &str,
    single_datasource_uid: &str,
    dashboard: &Value,
) -> String {
    if !is_variable_reference(uid) {
        return uid.to_string();
    }

    if is_prometheus_variable(uid, dashboard) {
        debug!(
            variable = %uid,
            resolved = %single_datasource_uid,
            "resolved datasource variable"
        );
        return single_datasource_uid.to_string();
    }

    uid.to_string()
}
