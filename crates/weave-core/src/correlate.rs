//! Cross-dataset correlation
//!
//! Three strategies run over every unordered pair of analyzed datasets and
//! their results are concatenated, so one pair can appear several times
//! under different bases:
//!
//! 1. same-domain shared columns: Pearson per shared numeric column over
//!    vectors truncated to the shorter length (row positions, not aligned
//!    observations), averaged across columns
//! 2. time-aligned: series from a detected date column and the first
//!    numeric column, points matched within ±1 day, at least 3 pairs
//! 3. shared columns regardless of domain, with a lower acceptance bar
//!
//! Metric-to-metric correlation is a separate coarse heuristic over
//! aggregation pairs, not Pearson at all.

use chrono::NaiveDate;

use crate::dates::parse_date;
use crate::models::{
    AnalyzedDataset, ColumnType, CorrelationBasis, CorrelationResult, CorrelationStrength,
    Dataset, MetricAggregation,
};

/// Rows sampled when probing for a date-like column
const DATE_SAMPLE_ROWS: usize = 10;
/// Aligned date pairs required before the time strategy reports at all
const MIN_ALIGNED_PAIRS: usize = 3;
/// Acceptance floor for the time-aligned strategy
const TIME_MIN_COEFFICIENT: f64 = 0.3;
/// Acceptance floor for the domain-independent shared-column strategy
const SHARED_MIN_COEFFICIENT: f64 = 0.2;

const STRONG_THRESHOLD: f64 = 0.7;
const MODERATE_TIME_THRESHOLD: f64 = 0.5;
const MODERATE_SHARED_THRESHOLD: f64 = 0.4;

/// Metric-heuristic bonus for a shared trend label
const TREND_BONUS: f64 = 0.3;
/// Metric-heuristic bonus for averages within this distance of each other
const AVERAGE_BONUS: f64 = 0.2;
const AVERAGE_EPSILON: f64 = 10.0;

/// Pairs datasets and metric aggregations into correlation results
pub struct CorrelationEngine;

impl CorrelationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run all three dataset-pair strategies and sort the concatenated
    /// results by coefficient magnitude, strongest first.
    pub fn correlate(&self, datasets: &[AnalyzedDataset]) -> Vec<CorrelationResult> {
        let mut results = Vec::new();

        for i in 0..datasets.len() {
            for j in (i + 1)..datasets.len() {
                let a = &datasets[i];
                let b = &datasets[j];

                if a.domain() == b.domain() {
                    if let Some(result) = self.shared_column_result(
                        a,
                        b,
                        CorrelationBasis::Domain,
                        // Strategy 1 reports any usable value
                        0.0,
                    ) {
                        results.push(result);
                    }
                }
                if let Some(result) = self.time_aligned_result(a, b) {
                    results.push(result);
                }
                if let Some(result) =
                    self.shared_column_result(a, b, CorrelationBasis::Column, SHARED_MIN_COEFFICIENT)
                {
                    results.push(result);
                }
            }
        }

        sort_by_magnitude(&mut results);
        results
    }

    /// Heuristic pass over cross-domain aggregation pairs. Not Pearson:
    /// +0.3 when both metrics carry the same trend label, +0.2 when their
    /// averages sit within 10 of each other, clamped to [-1, 1]. Pairs
    /// scoring 0 are dropped.
    pub fn correlate_metrics(
        &self,
        aggregations: &[MetricAggregation],
    ) -> Vec<CorrelationResult> {
        let mut results = Vec::new();

        for i in 0..aggregations.len() {
            for j in (i + 1)..aggregations.len() {
                let a = &aggregations[i];
                let b = &aggregations[j];
                if a.domain == b.domain {
                    continue;
                }

                let same_trend = a.trend == b.trend;
                let close_averages = (a.average - b.average).abs() < AVERAGE_EPSILON;
                let mut coefficient = 0.0;
                let mut reasons = Vec::new();
                if same_trend {
                    coefficient += TREND_BONUS;
                    reasons.push(format!("both trending {}", a.trend));
                }
                if close_averages {
                    coefficient += AVERAGE_BONUS;
                    reasons.push("similar averages".to_string());
                }
                if coefficient == 0.0 {
                    continue;
                }
                let coefficient = coefficient.clamp(-1.0, 1.0);

                results.push(CorrelationResult {
                    entity_a: a.key(),
                    entity_b: b.key(),
                    basis: CorrelationBasis::Time,
                    coefficient,
                    strength: strength_for(coefficient, MODERATE_SHARED_THRESHOLD),
                    description: format!(
                        "{} and {} move together ({})",
                        a.key(),
                        b.key(),
                        reasons.join(", ")
                    ),
                });
            }
        }

        sort_by_magnitude(&mut results);
        results
    }

    fn shared_column_result(
        &self,
        a: &AnalyzedDataset,
        b: &AnalyzedDataset,
        basis: CorrelationBasis,
        min_coefficient: f64,
    ) -> Option<CorrelationResult> {
        let mut coefficients = Vec::new();

        for column in &a.dataset.columns {
            if a.dataset.column_type(column) != Some(ColumnType::Number) {
                continue;
            }
            if b.dataset.column_type(column) != Some(ColumnType::Number) {
                continue;
            }
            let x = a.dataset.numeric_column(column);
            let y = b.dataset.numeric_column(column);
            let n = x.len().min(y.len());
            if n < 2 {
                continue;
            }
            coefficients.push(pearson(&x[..n], &y[..n]));
        }

        if coefficients.is_empty() {
            return None;
        }
        let coefficient = coefficients.iter().sum::<f64>() / coefficients.len() as f64;
        if coefficient.abs() < min_coefficient {
            tracing::debug!(
                a = %a.dataset.name,
                b = %b.dataset.name,
                coefficient,
                "shared-column correlation below threshold"
            );
            return None;
        }

        let strength = strength_for(coefficient, MODERATE_SHARED_THRESHOLD);
        Some(CorrelationResult {
            entity_a: a.dataset.name.clone(),
            entity_b: b.dataset.name.clone(),
            basis,
            coefficient,
            strength,
            description: interpret(&a.dataset.name, &b.dataset.name, coefficient, strength),
        })
    }

    fn time_aligned_result(
        &self,
        a: &AnalyzedDataset,
        b: &AnalyzedDataset,
    ) -> Option<CorrelationResult> {
        let series_a = dated_series(&a.dataset)?;
        let series_b = dated_series(&b.dataset)?;

        let mut xs = Vec::new();
        let mut ys = Vec::new();
        let mut bi = 0;
        for (date, value) in &series_a {
            while bi < series_b.len() && (series_b[bi].0 - *date).num_days() < -1 {
                bi += 1;
            }
            if bi < series_b.len() && (series_b[bi].0 - *date).num_days().abs() <= 1 {
                xs.push(*value);
                ys.push(series_b[bi].1);
                bi += 1;
            }
        }

        // Fewer than 3 aligned days means no result at all, not a zero one
        if xs.len() < MIN_ALIGNED_PAIRS {
            return None;
        }
        let coefficient = pearson(&xs, &ys);
        if coefficient.abs() < TIME_MIN_COEFFICIENT {
            return None;
        }

        let strength = strength_for(coefficient, MODERATE_TIME_THRESHOLD);
        Some(CorrelationResult {
            entity_a: a.dataset.name.clone(),
            entity_b: b.dataset.name.clone(),
            basis: CorrelationBasis::Time,
            coefficient,
            strength,
            description: interpret(&a.dataset.name, &b.dataset.name, coefficient, strength),
        })
    }
}

impl Default for CorrelationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Pearson correlation, `(nΣxy − ΣxΣy) / sqrt((nΣx²−(Σx)²)(nΣy²−(Σy)²))`,
/// over the shorter of the two slices. Zero variance yields 0, not an
/// error.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let n_f = n as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;
    for k in 0..n {
        sum_x += x[k];
        sum_y += y[k];
        sum_xy += x[k] * y[k];
        sum_x2 += x[k] * x[k];
        sum_y2 += y[k] * y[k];
    }
    let denominator = ((n_f * sum_x2 - sum_x * sum_x) * (n_f * sum_y2 - sum_y * sum_y)).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    ((n_f * sum_xy - sum_x * sum_y) / denominator).clamp(-1.0, 1.0)
}

fn sort_by_magnitude(results: &mut [CorrelationResult]) {
    results.sort_by(|a, b| {
        b.coefficient
            .abs()
            .partial_cmp(&a.coefficient.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn strength_for(coefficient: f64, moderate_threshold: f64) -> CorrelationStrength {
    let abs = coefficient.abs();
    if abs > STRONG_THRESHOLD {
        CorrelationStrength::Strong
    } else if abs > moderate_threshold {
        CorrelationStrength::Moderate
    } else {
        CorrelationStrength::Weak
    }
}

// The adverb comes from the already-assigned strength label, which uses a
// per-strategy moderate threshold.
fn interpret(
    entity_a: &str,
    entity_b: &str,
    coefficient: f64,
    strength: CorrelationStrength,
) -> String {
    let direction = if coefficient >= 0.0 {
        "increases"
    } else {
        "decreases"
    };
    let adverb = match strength {
        CorrelationStrength::Strong => "strongly",
        CorrelationStrength::Moderate => "moderately",
        CorrelationStrength::Weak => "weakly",
    };
    format!(
        "As {} increases, {} {} {}",
        entity_a, entity_b, adverb, direction
    )
}

/// `(date, value)` points from the first date-like column and the first
/// numeric column, sorted by date. None when either column is missing.
fn dated_series(dataset: &Dataset) -> Option<Vec<(NaiveDate, f64)>> {
    let date_column = dataset.columns.iter().find(|column| {
        dataset.sample_rows(DATE_SAMPLE_ROWS).iter().any(|row| {
            row.field(column)
                .map(|value| parse_date(&value.to_string()).is_some())
                .unwrap_or(false)
        })
    })?;
    let value_column = dataset
        .columns
        .iter()
        .find(|column| dataset.column_type(column) == Some(ColumnType::Number))?;

    let mut series: Vec<(NaiveDate, f64)> = dataset
        .rows
        .iter()
        .filter_map(|row| {
            let date = parse_date(&row.field(date_column)?.to_string())?;
            let value = row.field(value_column).and_then(|v| v.as_number())?;
            Some((date, value))
        })
        .collect();
    series.sort_by_key(|(date, _)| *date);
    Some(series)
}
