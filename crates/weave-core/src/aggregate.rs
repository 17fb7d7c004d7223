//! Metric aggregation
//!
//! `MetricRegistry` accumulates running statistics per `domain:metric` key.
//! A registry is built fresh for every analysis run and dropped with it.
//! It is a plain value rather than shared state, so concurrent runs cannot
//! interleave writes.
//!
//! Tabular ingestion carries a quirk worth knowing about: numeric columns
//! land under their own (lowercased) column name, and for sports, financial
//! and health datasets a fixed canonical vocabulary is probed by substring
//! match against the column name. A column that matches a canonical name is
//! ingested a second time under the canonical alias, so a column literally
//! named `goals` counts every value twice under `sports:goals`. Callers
//! that need unduplicated counts should read the raw column-name key.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{
    Dataset, Domain, HistoryPoint, MetricAggregation, ScalarValue, TextExtraction, Trend,
};

/// History points required before a trend label is computed
const TREND_MIN_POINTS: usize = 3;
/// Fractional change between trailing averages that moves trend off stable
const TREND_THRESHOLD: f64 = 0.10;

/// Canonical metric names probed against column names, per domain
const CANONICAL_METRICS: &[(Domain, &[&str])] = &[
    (
        Domain::Sports,
        &["goals", "assists", "points", "score", "minutes"],
    ),
    (
        Domain::Financial,
        &["amount", "price", "cost", "balance", "total"],
    ),
    (
        Domain::Health,
        &["steps", "calories", "weight", "sleep", "distance"],
    ),
];

fn canonical_metrics(domain: Domain) -> &'static [&'static str] {
    CANONICAL_METRICS
        .iter()
        .find(|(d, _)| *d == domain)
        .map(|(_, names)| *names)
        .unwrap_or(&[])
}

/// Per-run accumulator of metric statistics
#[derive(Debug, Default)]
pub struct MetricRegistry {
    metrics: HashMap<String, MetricAggregation>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one value into the aggregation keyed `domain:metric`.
    ///
    /// Non-finite and non-positive values are skipped without error; the
    /// pipeline treats them as absent rather than failing a run over one
    /// bad cell.
    pub fn ingest(
        &mut self,
        metric: &str,
        value: f64,
        domain: Domain,
        timestamp: DateTime<Utc>,
        source: &str,
    ) {
        if !value.is_finite() || value <= 0.0 {
            tracing::debug!(metric, value, "skipping unusable metric value");
            return;
        }

        let key = format!("{}:{}", domain, metric);
        let entry = self
            .metrics
            .entry(key)
            .or_insert_with(|| MetricAggregation {
                domain,
                metric: metric.to_string(),
                total: 0.0,
                count: 0,
                average: 0.0,
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
                trend: Trend::Stable,
                history: Vec::new(),
            });

        entry.total += value;
        entry.count += 1;
        entry.average = entry.total / entry.count as f64;
        entry.min = entry.min.min(value);
        entry.max = entry.max.max(value);
        entry.history.push(HistoryPoint {
            date: timestamp,
            value,
            source: source.to_string(),
        });
        entry.trend = trend_of(&entry.history);
    }

    /// Ingest every numeric column of a tabular dataset.
    ///
    /// Each value lands under its lowercased column name; columns matching
    /// a canonical metric name for the domain (exact or substring) are
    /// ingested again under the canonical alias. See the module docs for
    /// the double-counting this implies.
    pub fn ingest_dataset(&mut self, dataset: &Dataset, domain: Domain) {
        let aliases = canonical_metrics(domain);
        for row in &dataset.rows {
            for column in &dataset.columns {
                let Some(value) = row.field(column).and_then(ScalarValue::as_number) else {
                    continue;
                };
                let name = column.to_lowercase();
                self.ingest(&name, value, domain, row.timestamp, &dataset.id);
                for alias in aliases {
                    if name.contains(alias) {
                        self.ingest(alias, value, domain, row.timestamp, &dataset.id);
                    }
                }
            }
        }
    }

    /// Ingest the metrics a text entry's extraction produced
    pub fn ingest_extraction(&mut self, domain: Domain, extraction: &TextExtraction, source: &str) {
        for (metric, value) in &extraction.unit.metrics {
            self.ingest(metric, *value, domain, extraction.timestamp, source);
        }
    }

    pub fn get(&self, domain: Domain, metric: &str) -> Option<&MetricAggregation> {
        self.metrics.get(&format!("{}:{}", domain, metric))
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// All aggregations, sorted by `(domain, metric)` for stable output
    pub fn snapshot(&self) -> Vec<MetricAggregation> {
        let mut all: Vec<MetricAggregation> = self.metrics.values().cloned().collect();
        all.sort_by(|a, b| {
            a.domain
                .cmp(&b.domain)
                .then_with(|| a.metric.cmp(&b.metric))
        });
        all
    }
}

/// Trend over the three most recent points: the average of the newer pair
/// against the average of the older pair, with a ±10% band. Older history
/// is retained for display but never affects the label.
fn trend_of(history: &[HistoryPoint]) -> Trend {
    if history.len() < TREND_MIN_POINTS {
        return Trend::Stable;
    }
    let n = history.len();
    let older = (history[n - 3].value + history[n - 2].value) / 2.0;
    let newer = (history[n - 2].value + history[n - 1].value) / 2.0;
    if newer > older * (1.0 + TREND_THRESHOLD) {
        Trend::Increasing
    } else if newer < older * (1.0 - TREND_THRESHOLD) {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnType, Record};

    fn ts() -> DateTime<Utc> {
        Utc::now()
    }

    fn sports_dataset(column: &str, values: &[f64]) -> Dataset {
        let rows = values
            .iter()
            .enumerate()
            .map(|(i, v)| Record {
                id: format!("r{}", i),
                dataset_id: "d1".to_string(),
                fields: Some(HashMap::from([(
                    column.to_string(),
                    ScalarValue::Number(*v),
                )])),
                text: None,
                timestamp: ts(),
            })
            .collect();
        Dataset {
            id: "d1".to_string(),
            name: "practice log".to_string(),
            columns: vec![column.to_string()],
            column_types: HashMap::from([(column.to_string(), ColumnType::Number)]),
            rows,
            created_at: ts(),
        }
    }

    #[test]
    fn test_ingest_updates_running_stats() {
        let mut registry = MetricRegistry::new();
        for v in [2.0, 4.0, 6.0] {
            registry.ingest("goals", v, Domain::Sports, ts(), "d1");
        }

        let agg = registry.get(Domain::Sports, "goals").unwrap();
        assert_eq!(agg.count, 3);
        assert!((agg.total - 12.0).abs() < 1e-9);
        assert!((agg.average - 4.0).abs() < 1e-9);
        assert!((agg.min - 2.0).abs() < 1e-9);
        assert!((agg.max - 6.0).abs() < 1e-9);
        assert_eq!(agg.key(), "sports:goals");
    }

    #[test]
    fn test_ingest_average_matches_batch_recomputation() {
        let mut registry = MetricRegistry::new();
        let values = [5.0, 5.0, 7.0, 1.5];
        for v in values {
            registry.ingest("miles", v, Domain::Health, ts(), "d1");
            let agg = registry.get(Domain::Health, "miles").unwrap();
            assert!((agg.average - agg.total / agg.count as f64).abs() < 1e-9);
        }

        let agg = registry.get(Domain::Health, "miles").unwrap();
        assert_eq!(agg.count, values.len() as u64);
        assert!((agg.total - values.iter().sum::<f64>()).abs() < 1e-9);
    }

    #[test]
    fn test_ingest_same_value_twice_doubles_total_and_count() {
        let mut registry = MetricRegistry::new();
        registry.ingest("goals", 5.0, Domain::Sports, ts(), "d1");
        registry.ingest("goals", 5.0, Domain::Sports, ts(), "d1");

        let agg = registry.get(Domain::Sports, "goals").unwrap();
        assert_eq!(agg.count, 2);
        assert!((agg.total - 10.0).abs() < 1e-9);
        assert!((agg.average - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_ingest_skips_unusable_values() {
        let mut registry = MetricRegistry::new();
        registry.ingest("goals", f64::NAN, Domain::Sports, ts(), "d1");
        registry.ingest("goals", f64::INFINITY, Domain::Sports, ts(), "d1");
        registry.ingest("goals", -1.0, Domain::Sports, ts(), "d1");
        registry.ingest("goals", 0.0, Domain::Sports, ts(), "d1");

        assert!(registry.is_empty());
    }

    #[test]
    fn test_trend_requires_three_points() {
        let mut registry = MetricRegistry::new();
        registry.ingest("goals", 1.0, Domain::Sports, ts(), "d1");
        registry.ingest("goals", 10.0, Domain::Sports, ts(), "d1");
        assert_eq!(
            registry.get(Domain::Sports, "goals").unwrap().trend,
            Trend::Stable
        );

        registry.ingest("goals", 20.0, Domain::Sports, ts(), "d1");
        assert_eq!(
            registry.get(Domain::Sports, "goals").unwrap().trend,
            Trend::Increasing
        );
    }

    #[test]
    fn test_trend_decreasing_and_stable_band() {
        let mut registry = MetricRegistry::new();
        for v in [20.0, 10.0, 1.0] {
            registry.ingest("steps", v, Domain::Health, ts(), "d1");
        }
        assert_eq!(
            registry.get(Domain::Health, "steps").unwrap().trend,
            Trend::Decreasing
        );

        let mut registry = MetricRegistry::new();
        for v in [10.0, 10.0, 10.5] {
            registry.ingest("steps", v, Domain::Health, ts(), "d1");
        }
        // (10+10.5)/2 = 10.25 is within 10% of 10.0
        assert_eq!(
            registry.get(Domain::Health, "steps").unwrap().trend,
            Trend::Stable
        );
    }

    #[test]
    fn test_trend_considers_only_trailing_window() {
        let mut registry = MetricRegistry::new();
        for v in [100.0, 5.0, 5.0, 5.0] {
            registry.ingest("calories", v, Domain::Health, ts(), "d1");
        }
        assert_eq!(
            registry.get(Domain::Health, "calories").unwrap().trend,
            Trend::Stable
        );
    }

    #[test]
    fn test_ingest_dataset_double_counts_canonical_column() {
        let mut registry = MetricRegistry::new();
        registry.ingest_dataset(&sports_dataset("goals", &[2.0]), Domain::Sports);

        // Own-name ingestion plus the canonical probe hit the same key
        let agg = registry.get(Domain::Sports, "goals").unwrap();
        assert_eq!(agg.count, 2);
        assert!((agg.total - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_ingest_dataset_substring_probe_adds_alias() {
        let mut registry = MetricRegistry::new();
        registry.ingest_dataset(&sports_dataset("total_goals", &[3.0]), Domain::Sports);

        assert_eq!(
            registry.get(Domain::Sports, "total_goals").unwrap().count,
            1
        );
        assert_eq!(registry.get(Domain::Sports, "goals").unwrap().count, 1);
        // "total" is only canonical for financial, not sports
        assert!(registry.get(Domain::Sports, "total").is_none());
    }

    #[test]
    fn test_ingest_dataset_skips_non_canonical_domain() {
        let mut registry = MetricRegistry::new();
        registry.ingest_dataset(&sports_dataset("tasks", &[4.0]), Domain::Productivity);

        assert_eq!(registry.get(Domain::Productivity, "tasks").unwrap().count, 1);
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[test]
    fn test_snapshot_is_sorted_by_domain_then_metric() {
        let mut registry = MetricRegistry::new();
        registry.ingest("steps", 1.0, Domain::Health, ts(), "d1");
        registry.ingest("goals", 1.0, Domain::Sports, ts(), "d1");
        registry.ingest("assists", 1.0, Domain::Sports, ts(), "d1");

        let keys: Vec<String> = registry.snapshot().iter().map(|a| a.key()).collect();
        assert_eq!(keys, vec!["sports:assists", "sports:goals", "health:steps"]);
    }

    #[test]
    fn test_ingest_extraction_metrics() {
        let mut registry = MetricRegistry::new();
        let mut unit = crate::models::ExtractedUnit::empty();
        unit.metrics.insert("goals".to_string(), 2.0);
        unit.metrics.insert("miles".to_string(), 7.0);
        let extraction = TextExtraction {
            record_id: "r0".to_string(),
            timestamp: ts(),
            unit,
        };

        registry.ingest_extraction(Domain::Sports, &extraction, "journal");
        assert_eq!(registry.get(Domain::Sports, "goals").unwrap().count, 1);
        assert_eq!(registry.get(Domain::Sports, "miles").unwrap().count, 1);
        assert_eq!(
            registry.get(Domain::Sports, "goals").unwrap().history[0].source,
            "journal"
        );
    }
}
