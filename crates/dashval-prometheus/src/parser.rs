//! Metric-name extraction from PromQL query text.
//!
//! The validator only needs the metric names a query references, not a full
//! parse tree. [`MetricExtractor`] is the seam for plugging in a real PromQL
//! parser; [`PromqlMetricScanner`] is the shipped default, a lexical
//! heuristic that strips string literals, label-matcher blocks, range
//! selectors and grouping clauses, then collects the identifiers left in
//! selector position.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, ValidatorError};

/// PromQL identifier: letters, digits, underscores and the recording-rule
/// colon.
static IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_:][A-Za-z0-9_:]*").unwrap_or_else(|_| unreachable!()));

/// Grouping clauses whose parenthesized label lists must not be mistaken for
/// metric names, e.g. `sum by (instance) (...)`.
static GROUPING_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:by|without|on|ignoring|group_left|group_right)\s*\([^)]*\)")
        .unwrap_or_else(|_| unreachable!())
});

/// Bare PromQL keywords and operators that scan like identifiers.
const KEYWORDS: &[&str] = &[
    "and",
    "or",
    "unless",
    "by",
    "without",
    "on",
    "ignoring",
    "group_left",
    "group_right",
    "offset",
    "bool",
    "atan2",
    "inf",
    "nan",
];

/// Extracts the metric names referenced by one query.
///
/// Implementations may wrap a full query-language parser; the validator
/// treats extraction failures as per-query problems, not fatal errors.
pub trait MetricExtractor: Send + Sync {
    /// Returns the referenced metric names in first-appearance order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query text cannot be scanned.
    fn extract_metrics(&self, query_text: &str) -> Result<Vec<String>>;
}

/// Lexical metric-name scanner for PromQL.
///
/// Not a grammar-complete parser: it is a documented heuristic that covers
/// the selector shapes dashboards actually use. Queries with unbalanced
/// quotes, braces or brackets are rejected as unparseable.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromqlMetricScanner;

impl PromqlMetricScanner {
    /// Creates a scanner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MetricExtractor for PromqlMetricScanner {
    fn extract_metrics(&self, query_text: &str) -> Result<Vec<String>> {
        let stripped = strip_string_literals(query_text)?;
        let stripped = strip_delimited(&stripped, '{', '}')?;
        let stripped = strip_delimited(&stripped, '[', ']')?;
        let stripped = GROUPING_CLAUSE.replace_all(&stripped, " ").into_owned();

        let bytes = stripped.as_bytes();
        let mut metrics = Vec::new();
        let mut seen = HashSet::new();

        for found in IDENT.find_iter(&stripped) {
            // Skip matches that start mid-token, like the "e5" in "1e5".
            if found.start() > 0 {
                let prev = bytes[found.start() - 1];
                if prev.is_ascii_alphanumeric() || prev == b'_' || prev == b'.' || prev == b'$' {
                    continue;
                }
            }

            let name = found.as_str();
            if KEYWORDS.contains(&name) {
                continue;
            }
            // An identifier followed by '(' is a function or aggregation.
            if next_significant_byte(bytes, found.end()) == Some(b'(') {
                continue;
            }

            if seen.insert(name.to_string()) {
                metrics.push(name.to_string());
            }
        }

        Ok(metrics)
    }
}

/// Blanks out single- and double-quoted literals, preserving offsets.
fn strip_string_literals(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch != '"' && ch != '\'' {
            out.push(ch);
            continue;
        }

        let quote = ch;
        out.push(' ');
        let mut terminated = false;
        while let Some(inner) = chars.next() {
            out.push(' ');
            if inner == '\\' {
                // Consume the escaped character too.
                if chars.next().is_some() {
                    out.push(' ');
                }
            } else if inner == quote {
                terminated = true;
                break;
            }
        }
        if !terminated {
            return Err(ValidatorError::QueryParse {
                reason: "unterminated string literal".to_string(),
            });
        }
    }

    Ok(out)
}

/// Blanks out a non-nesting delimited region, e.g. `{...}` label matchers or
/// `[...]` range selectors.
fn strip_delimited(text: &str, open: char, close: char) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0u32;

    for ch in text.chars() {
        if ch == open {
            if depth > 0 {
                return Err(ValidatorError::QueryParse {
                    reason: format!("unexpected nested '{open}'"),
                });
            }
            depth = 1;
            out.push(' ');
        } else if ch == close {
            if depth == 0 {
                return Err(ValidatorError::QueryParse {
                    reason: format!("unbalanced '{close}'"),
                });
            }
            depth = 0;
            out.push(' ');
        } else if depth > 0 {
            out.push(' ');
        } else {
            out.push(ch);
        }
    }

    if depth != 0 {
        return Err(ValidatorError::QueryParse {
            reason: format!("unbalanced '{open}'"),
        });
    }

    Ok(out)
}

/// Returns the first non-whitespace byte at or after `start`.
fn next_significant_byte(bytes: &[u8], start: usize) -> Option<u8> {
    bytes[start..]
        .iter()
        .copied()
        .find(|b| !b.is_ascii_whitespace())
}
