//! Domain classification for datasets
//!
//! Assigns a coarse domain to a dataset from its column names and sampled
//! value shapes. Classification is first-match-wins in a fixed priority
//! order (financial → sports → health → productivity → general); a dataset
//! matching several domains takes the earliest. That ordering is policy,
//! not an accident; tests pin it.
//!
//! Text-entry datasets are classified from their extracted categories, and
//! datasets that were already processed once (they carry `domain` /
//! `metrics` columns) are classified by trusting the stored metadata.

use std::collections::{BTreeSet, HashMap};

use regex::Regex;

use crate::models::{
    ColumnType, Domain, DomainClassification, ExtractedUnit, Record, ScalarValue,
};

/// Rows sampled per dataset when testing value shapes
const SAMPLE_ROWS: usize = 10;

const BASE_CONFIDENCE: f64 = 0.5;
const KEYWORD_CONFIDENCE: f64 = 0.3;
const VALUE_CONFIDENCE: f64 = 0.2;

/// Column-name keywords per domain, in classification priority order.
/// Food and home are reached via text categories and stored metadata, not
/// via the tabular keyword pass.
const DOMAIN_COLUMN_KEYWORDS: &[(Domain, &[&str])] = &[
    (
        Domain::Financial,
        &[
            "amount", "price", "cost", "balance", "payment", "expense", "income", "budget",
            "total", "fee",
        ],
    ),
    (
        Domain::Sports,
        &[
            "goals", "assists", "score", "team", "opponent", "result", "match", "game", "points",
            "wins",
        ],
    ),
    (
        Domain::Health,
        &[
            "steps", "calories", "weight", "sleep", "heart", "exercise", "workout", "distance",
            "bmi",
        ],
    ),
    (
        Domain::Productivity,
        &[
            "tasks", "hours", "completed", "project", "deadline", "meetings", "focus", "done",
        ],
    ),
];

/// Which domain a text category votes for
const CATEGORY_DOMAINS: &[(&str, Domain)] = &[
    ("sports_performance", Domain::Sports),
    ("health_metrics", Domain::Health),
    ("activities", Domain::Health),
    ("food", Domain::Food),
    ("home", Domain::Home),
];

/// Classifies datasets into domains
pub struct DomainClassifier {
    financial_value: Regex,
    sports_value: Regex,
    health_value: Regex,
    productivity_value: Regex,
}

impl DomainClassifier {
    pub fn new() -> Self {
        Self {
            // Currency symbol or decimal-with-two-places
            financial_value: Regex::new(r"^\$?\d+\.\d{2}$").expect("valid regex"),
            sports_value: Regex::new(r"\b(win|won|loss|lost|draw|vs)\b").expect("valid regex"),
            // Unit-suffixed measurement strings ("70.5 kg", "7 hrs")
            health_value: Regex::new(r"^\d+(\.\d+)?\s*(kg|kgs|lbs|bpm|kcal|cals?|hrs?|hours?)$")
                .expect("valid regex"),
            productivity_value: Regex::new(
                r"^(done|todo|in[ -]?progress|yes|no|complete|completed|\d{1,3}%)$",
            )
            .expect("valid regex"),
        }
    }

    /// Classify a tabular dataset from its schema and sampled rows.
    ///
    /// First-match-wins: domains are probed in priority order and the
    /// first with any indicator is returned. Confidence is additive
    /// (0.5 base, +0.3 for a column-name keyword, +0.2 for a value-shape
    /// match) capped at 1.0. No indicator at all means general at 0.5.
    pub fn classify(
        &self,
        columns: &[String],
        column_types: &HashMap<String, ColumnType>,
        sample_rows: &[Record],
    ) -> DomainClassification {
        let sample = &sample_rows[..sample_rows.len().min(SAMPLE_ROWS)];

        for (domain, keywords) in DOMAIN_COLUMN_KEYWORDS {
            let mut indicators = BTreeSet::new();

            for column in columns {
                let lower = column.to_lowercase();
                if keywords.iter().any(|keyword| lower.contains(keyword)) {
                    indicators.insert(format!("column:{}", column));
                }
            }
            let keyword_hit = !indicators.is_empty();

            for column in columns {
                if self.column_values_match(*domain, column, column_types, sample) {
                    indicators.insert(format!("values:{}", column));
                }
            }
            let value_hit = indicators.iter().any(|i| i.starts_with("values:"));

            if keyword_hit || value_hit {
                let mut confidence = BASE_CONFIDENCE;
                if keyword_hit {
                    confidence += KEYWORD_CONFIDENCE;
                }
                if value_hit {
                    confidence += VALUE_CONFIDENCE;
                }
                let classification = DomainClassification {
                    domain: *domain,
                    confidence: confidence.min(1.0),
                    indicators,
                };
                tracing::debug!(
                    domain = %classification.domain,
                    confidence = classification.confidence,
                    "classified dataset from schema"
                );
                return classification;
            }
        }

        DomainClassification::general()
    }

    /// Classify a text-entry dataset from its extracted categories:
    /// categories vote for domains; ties resolve in priority order.
    /// Mirrors the tabular confidence shape, +0.3 when any category
    /// voted and +0.2 when any entry produced metrics.
    pub fn classify_text(&self, units: &[ExtractedUnit]) -> DomainClassification {
        let mut votes: HashMap<Domain, usize> = HashMap::new();
        let mut indicators = BTreeSet::new();

        for unit in units {
            for (category, domain) in CATEGORY_DOMAINS {
                if unit.categories.contains_key(*category) {
                    *votes.entry(*domain).or_insert(0) += 1;
                    indicators.insert(format!("category:{}", category));
                }
            }
        }

        let has_metrics = units.iter().any(|unit| !unit.metrics.is_empty());
        if has_metrics {
            indicators.insert("text:metrics".to_string());
        }

        // First domain in priority order holding the maximum vote count
        let winner = Domain::all()
            .iter()
            .filter_map(|domain| votes.get(domain).map(|count| (*domain, *count)))
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(domain, _)| domain);

        match winner {
            Some(domain) => {
                let mut confidence = BASE_CONFIDENCE + KEYWORD_CONFIDENCE;
                if has_metrics {
                    confidence += VALUE_CONFIDENCE;
                }
                tracing::debug!(domain = %domain, "classified dataset from text categories");
                DomainClassification {
                    domain,
                    confidence: confidence.min(1.0),
                    indicators,
                }
            }
            None => DomainClassification::general(),
        }
    }

    /// Classify an already-processed dataset by trusting its stored
    /// `domain` and `confidence` cells.
    pub fn classify_from_metadata(&self, first_row: &Record) -> DomainClassification {
        let domain = first_row
            .field("domain")
            .and_then(ScalarValue::as_text)
            .and_then(|s| s.parse::<Domain>().ok())
            .unwrap_or(Domain::General);

        let confidence = first_row
            .field("confidence")
            .and_then(ScalarValue::as_number)
            .unwrap_or(BASE_CONFIDENCE)
            .clamp(0.0, 1.0);

        let mut indicators = BTreeSet::new();
        indicators.insert("metadata:domain".to_string());

        DomainClassification {
            domain,
            confidence,
            indicators,
        }
    }

    fn column_values_match(
        &self,
        domain: Domain,
        column: &str,
        column_types: &HashMap<String, ColumnType>,
        sample: &[Record],
    ) -> bool {
        let column_type = column_types.get(column).copied();
        sample.iter().any(|row| {
            let Some(value) = row.field(column) else {
                return false;
            };
            let text = value.to_string().trim().to_lowercase();
            if text.is_empty() {
                return false;
            }
            match (domain, column_type) {
                (Domain::Financial, Some(ColumnType::Number | ColumnType::Text)) => {
                    self.financial_value.is_match(&text)
                }
                (Domain::Sports, Some(ColumnType::Text)) => self.sports_value.is_match(&text),
                (Domain::Health, Some(ColumnType::Text)) => self.health_value.is_match(&text),
                (Domain::Productivity, Some(ColumnType::Text | ColumnType::Bool)) => {
                    self.productivity_value.is_match(&text)
                }
                _ => false,
            }
        })
    }
}

impl Default for DomainClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a dataset already carries pipeline output columns and should be
/// classified from metadata instead of re-derived
pub fn is_preprocessed(columns: &[String]) -> bool {
    let lower: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();
    lower.iter().any(|c| c == "domain") && lower.iter().any(|c| c == "metrics")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(fields: &[(&str, ScalarValue)]) -> Record {
        Record {
            id: "r".to_string(),
            dataset_id: "d".to_string(),
            fields: Some(
                fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            ),
            text: None,
            timestamp: Utc::now(),
        }
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_classify_priority_order_financial_before_sports() {
        let classifier = DomainClassifier::new();
        let cols = columns(&["goals", "amount"]);
        let types = HashMap::from([
            ("goals".to_string(), ColumnType::Number),
            ("amount".to_string(), ColumnType::Number),
        ]);
        let rows = vec![record(&[
            ("goals", ScalarValue::Number(2.0)),
            ("amount", ScalarValue::Number(10.0)),
        ])];

        let result = classifier.classify(&cols, &types, &rows);
        assert_eq!(result.domain, Domain::Financial);
    }

    #[test]
    fn test_classify_sports_keyword_and_value() {
        let classifier = DomainClassifier::new();
        let cols = columns(&["goals", "assists", "result"]);
        let types = HashMap::from([
            ("goals".to_string(), ColumnType::Number),
            ("assists".to_string(), ColumnType::Number),
            ("result".to_string(), ColumnType::Text),
        ]);
        let rows = vec![record(&[
            ("goals", ScalarValue::Number(2.0)),
            ("result", ScalarValue::Text("win".to_string())),
        ])];

        let result = classifier.classify(&cols, &types, &rows);
        assert_eq!(result.domain, Domain::Sports);
        assert!((result.confidence - 1.0).abs() < 1e-9);
        assert!(result.indicators.contains("column:goals"));
        assert!(result.indicators.contains("values:result"));
    }

    #[test]
    fn test_classify_keyword_only_confidence() {
        let classifier = DomainClassifier::new();
        let cols = columns(&["date", "steps", "calories"]);
        let types = HashMap::from([
            ("date".to_string(), ColumnType::Text),
            ("steps".to_string(), ColumnType::Number),
            ("calories".to_string(), ColumnType::Number),
        ]);
        let rows = vec![record(&[
            ("steps", ScalarValue::Number(9000.0)),
            ("calories", ScalarValue::Number(2100.0)),
        ])];

        let result = classifier.classify(&cols, &types, &rows);
        assert_eq!(result.domain, Domain::Health);
        assert!((result.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_classify_productivity_status_values() {
        let classifier = DomainClassifier::new();
        let cols = columns(&["tasks_completed", "status"]);
        let types = HashMap::from([
            ("tasks_completed".to_string(), ColumnType::Number),
            ("status".to_string(), ColumnType::Text),
        ]);
        let rows = vec![record(&[
            ("tasks_completed", ScalarValue::Number(5.0)),
            ("status", ScalarValue::Text("done".to_string())),
        ])];

        let result = classifier.classify(&cols, &types, &rows);
        assert_eq!(result.domain, Domain::Productivity);
        assert!((result.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_classify_no_indicators_is_general() {
        let classifier = DomainClassifier::new();
        let cols = columns(&["alpha", "beta"]);
        let types = HashMap::from([
            ("alpha".to_string(), ColumnType::Text),
            ("beta".to_string(), ColumnType::Text),
        ]);
        let rows = vec![record(&[("alpha", ScalarValue::Text("x".to_string()))])];

        let result = classifier.classify(&cols, &types, &rows);
        assert_eq!(result.domain, Domain::General);
        assert!((result.confidence - 0.5).abs() < 1e-9);
        assert!(result.indicators.is_empty());
    }

    #[test]
    fn test_classify_is_deterministic() {
        let classifier = DomainClassifier::new();
        let cols = columns(&["goals", "amount"]);
        let types = HashMap::from([
            ("goals".to_string(), ColumnType::Number),
            ("amount".to_string(), ColumnType::Number),
        ]);
        let rows = vec![record(&[("goals", ScalarValue::Number(1.0))])];

        let a = classifier.classify(&cols, &types, &rows);
        let b = classifier.classify(&cols, &types, &rows);
        assert_eq!(a.domain, b.domain);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.indicators, b.indicators);
    }

    #[test]
    fn test_classify_from_metadata_trusts_stored_fields() {
        let classifier = DomainClassifier::new();
        let row = record(&[
            ("domain", ScalarValue::Text("sports".to_string())),
            ("confidence", ScalarValue::Number(0.9)),
            ("metrics", ScalarValue::Text("{\"goals\":2}".to_string())),
        ]);

        let result = classifier.classify_from_metadata(&row);
        assert_eq!(result.domain, Domain::Sports);
        assert!((result.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_classify_from_metadata_missing_domain_is_general() {
        let classifier = DomainClassifier::new();
        let row = record(&[("note", ScalarValue::Text("hello".to_string()))]);

        let result = classifier.classify_from_metadata(&row);
        assert_eq!(result.domain, Domain::General);
        assert!((result.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_classify_text_from_categories() {
        let classifier = DomainClassifier::new();
        let mut unit = ExtractedUnit::empty();
        unit.categories
            .insert("sports_performance".to_string(), vec!["goal".to_string()]);
        unit.metrics.insert("goals".to_string(), 2.0);

        let result = classifier.classify_text(&[unit]);
        assert_eq!(result.domain, Domain::Sports);
        assert!((result.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_classify_text_without_votes_is_general() {
        let classifier = DomainClassifier::new();
        let result = classifier.classify_text(&[ExtractedUnit::empty()]);
        assert_eq!(result.domain, Domain::General);
    }

    #[test]
    fn test_is_preprocessed() {
        assert!(is_preprocessed(&columns(&["domain", "metrics", "insights"])));
        assert!(!is_preprocessed(&columns(&["goals", "assists"])));
    }
}
