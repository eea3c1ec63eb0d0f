//! Dashboard query compatibility validation.
//!
//! Checks whether the metrics a dashboard's queries reference actually exist
//! on a live datasource, and reports a compatibility score: overall and per
//! query. Metric listings go through the shared [`MetricsCache`] so repeated
//! validations of one datasource do not hammer its API.

use std::collections::HashSet;

use dashval_cache::MetricsCache;
use dashval_dashboard::{Query, extract_and_group};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, ValidatorError};
use crate::parser::{MetricExtractor, PromqlMetricScanner};

/// A datasource to validate against.
///
/// The HTTP client is externally constructed and pre-authenticated; the
/// validator only passes it through to the provider.
#[derive(Debug, Clone)]
pub struct Datasource {
    /// Unique identifier of the datasource.
    pub uid: String,
    /// Datasource type used for provider dispatch (e.g. "prometheus").
    pub ds_type: String,
    /// Display name used in error messages.
    pub name: String,
    /// Base URL of the datasource API.
    pub url: String,
    /// Pre-configured client carrying authentication.
    pub http_client: reqwest::Client,
}

/// Compatibility report for one query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Title of the panel the query belongs to.
    pub panel_title: String,
    /// Numeric ID of the panel the query belongs to.
    pub panel_id: i64,
    /// The query's reference ID within its panel.
    pub query_ref_id: String,
    /// Number of distinct metrics the query references.
    pub total_metrics: usize,
    /// How many of those metrics exist on the datasource.
    pub found_metrics: usize,
    /// The metrics the datasource does not expose.
    pub missing_metrics: Vec<String>,
    /// `found / total`, or 1.0 for a metric-free query.
    pub compatibility_score: f64,
    /// Set when the query text could not be scanned; such a query scores 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

/// Compatibility report for a whole set of queries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Number of queries submitted.
    pub total_queries: usize,
    /// Number of queries whose text scanned successfully.
    pub checked_queries: usize,
    /// Number of distinct metrics referenced across all checked queries.
    pub total_metrics: usize,
    /// How many of those metrics exist on the datasource.
    pub found_metrics: usize,
    /// Distinct missing metrics, in first-reference order.
    pub missing_metrics: Vec<String>,
    /// Overall compatibility in `0.0..=1.0`.
    pub compatibility_score: f64,
    /// Per-query reports, in submission order.
    pub query_breakdown: Vec<QueryResult>,
}

/// Per-query scan outcome, paired positionally with the input queries.
struct ParsedQuery {
    metrics: Vec<String>,
    parse_error: Option<String>,
}

/// Validates dashboard queries against a live datasource.
pub struct Validator {
    parser: Box<dyn MetricExtractor>,
    cache: MetricsCache,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Validator {
    /// Creates a validator with the default PromQL scanner.
    ///
    /// The cache is shared: cloning a [`MetricsCache`] shares its entries,
    /// so multiple validators can ride one metric listing.
    #[must_use]
    pub fn new(cache: MetricsCache) -> Self {
        Self {
            parser: Box::new(PromqlMetricScanner::new()),
            cache,
        }
    }

    /// Creates a validator with a custom metric extractor.
    #[must_use]
    pub fn with_parser(parser: Box<dyn MetricExtractor>, cache: MetricsCache) -> Self {
        Self { parser, cache }
    }

    /// Validates a set of extracted queries against the datasource.
    ///
    /// Queries that fail to scan are recorded in the breakdown with a parse
    /// error and a zero score; they never abort the check. Fetching the
    /// available-metric listing is the only fatal step.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::MetricsFetch`] if the metric listing cannot
    /// be obtained (no provider registered, network failure, bad response).
    pub async fn validate_queries(
        &self,
        queries: &[Query],
        datasource: &Datasource,
    ) -> Result<ValidationResult> {
        let (parsed, unique_metrics, checked_queries) = parse_queries(queries, self.parser.as_ref());

        let available = self
            .cache
            .get_metrics(
                &datasource.ds_type,
                &datasource.uid,
                &datasource.url,
                &datasource.http_client,
            )
            .await
            .map_err(|source| ValidatorError::MetricsFetch {
                datasource_name: datasource.name.clone(),
                source,
            })?;
        let available: HashSet<String> = available.into_iter().collect();

        let (found_metrics, missing_metrics, missing_set) =
            calculate_compatibility(&unique_metrics, &available);
        let compatibility_score = calculate_overall_score(
            queries.len(),
            checked_queries,
            unique_metrics.len(),
            found_metrics,
        );
        let query_breakdown = build_query_breakdown(queries, &parsed, &missing_set);

        info!(
            uid = %datasource.uid,
            total_queries = queries.len(),
            checked_queries,
            score = compatibility_score,
            "validated dashboard queries"
        );

        Ok(ValidationResult {
            total_queries: queries.len(),
            checked_queries,
            total_metrics: unique_metrics.len(),
            found_metrics,
            missing_metrics,
            compatibility_score,
            query_breakdown,
        })
    }

    /// Extracts the datasource's queries from a dashboard document and
    /// validates them.
    ///
    /// Queries grouped under other datasources are ignored; a dashboard with
    /// no queries for this datasource validates as fully compatible.
    ///
    /// # Errors
    ///
    /// Returns an extraction error for unsupported dashboard formats, or a
    /// fetch error as in [`Self::validate_queries`].
    pub async fn validate_dashboard(
        &self,
        dashboard: &Value,
        datasource: &Datasource,
    ) -> Result<ValidationResult> {
        let mut groups = extract_and_group(dashboard, &datasource.uid)?;
        let queries = groups.remove(&datasource.uid).unwrap_or_default();
        self.validate_queries(&queries, datasource).await
    }
}

/// Scans every query, collecting per-query outcomes and the deduplicated
/// metric list (first-seen order). Returns the number of queries that
/// scanned successfully.
fn parse_queries(
    queries: &[Query],
    parser: &dyn MetricExtractor,
) -> (Vec<ParsedQuery>, Vec<String>, usize) {
    let mut parsed = Vec::with_capacity(queries.len());
    let mut unique_metrics = Vec::new();
    let mut seen = HashSet::new();
    let mut checked = 0;

    for query in queries {
        match parser.extract_metrics(&query.query_text) {
            Ok(metrics) => {
                checked += 1;
                for metric in &metrics {
                    if seen.insert(metric.clone()) {
                        unique_metrics.push(metric.clone());
                    }
                }
                parsed.push(ParsedQuery {
                    metrics,
                    parse_error: None,
                });
            }
            Err(err) => {
                debug!(
                    ref_id = %query.ref_id,
                    error = %err,
                    "query failed to parse, skipping metric check"
                );
                parsed.push(ParsedQuery {
                    metrics: Vec::new(),
                    parse_error: Some(err.to_string()),
                });
            }
        }
    }

    (parsed, unique_metrics, checked)
}

/// Splits the referenced metrics into found and missing against the
/// available set. Missing metrics keep their first-reference order; the set
/// form is reused for the per-query breakdown.
fn calculate_compatibility(
    unique_metrics: &[String],
    available: &HashSet<String>,
) -> (usize, Vec<String>, HashSet<String>) {
    let mut missing_metrics = Vec::new();
    let mut missing_set = HashSet::new();

    for metric in unique_metrics {
        if !available.contains(metric) {
            missing_metrics.push(metric.clone());
            missing_set.insert(metric.clone());
        }
    }

    let found = unique_metrics.len() - missing_metrics.len();
    (found, missing_metrics, missing_set)
}

/// Overall score rules:
/// - no queries at all: trivially compatible (1.0);
/// - queries present but none scanned: nothing could be checked (0.0);
/// - checked queries referencing no metrics (`time()`, pure math): 1.0;
/// - otherwise the fraction of referenced metrics that exist.
fn calculate_overall_score(
    total_queries: usize,
    checked_queries: usize,
    total_metrics: usize,
    found_metrics: usize,
) -> f64 {
    if total_queries == 0 {
        return 1.0;
    }
    if checked_queries == 0 {
        return 0.0;
    }
    if total_metrics == 0 {
        return 1.0;
    }
    found_metrics as f64 / total_metrics as f64
}

/// Builds the per-query reports, in submission order.
fn build_query_breakdown(
    queries: &[Query],
    parsed: &[ParsedQuery],
    missing_set: &HashSet<String>,
) -> Vec<QueryResult> {
    queries
        .iter()
        .zip(parsed)
        .map(|(query, outcome)| {
            if let Some(reason) = &outcome.parse_error {
                return QueryResult {
                    panel_title: query.panel_title.clone(),
                    panel_id: query.panel_id,
                    query_ref_id: query.ref_id.clone(),
                    total_metrics: 0,
                    found_metrics: 0,
                    missing_metrics: Vec::new(),
                    compatibility_score: 0.0,
                    parse_error: Some(reason.clone()),
                };
            }

            let missing: Vec<String> = outcome
                .metrics
                .iter()
                .filter(|metric| missing_set.contains(*metric))
                .cloned()
                .collect();
            let total = outcome.metrics.len();
            let found = total - missing.len();
            let score = if total == 0 {
                1.0
            } else {
                found as f64 / total as f64
            };

            QueryResult {
                panel_title: query.panel_title.clone(),
                panel_id: query.panel_id,
                query_ref_id: query.ref_id.clone(),
                total_metrics: total,
                found_metrics: found,
                missing_metrics: missing,
                compatibility_score: score,
                parse_error: None,
            }
        })
        .collect()
}
