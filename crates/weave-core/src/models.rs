//! Domain models for weave

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ========== Row & Dataset Models ==========

/// A single cell value in a tabular record.
///
/// Rows are heterogeneous; the variant carries the type so downstream code
/// pattern-matches instead of re-checking at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl ScalarValue {
    /// Numeric view of the cell. Only `Number` cells count; text that
    /// happens to look numeric stays text (typing happens at import).
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScalarValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ScalarValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Number(n) => write!(f, "{}", n),
            ScalarValue::Text(s) => write!(f, "{}", s),
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Null => write!(f, ""),
        }
    }
}

/// Declared type of a dataset column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    Text,
    Bool,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Text => "text",
            Self::Bool => "bool",
        }
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "number" => Ok(Self::Number),
            "text" | "string" => Ok(Self::Text),
            "bool" | "boolean" => Ok(Self::Bool),
            _ => Err(format!("Unknown column type: {}", s)),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ingested unit: a tabular row or a free-text entry.
///
/// Immutable once created. Tabular records carry `fields` (cell lookup by
/// column name; iteration order comes from the owning dataset's `columns`
/// list); journal-style records carry `text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub dataset_id: String,
    /// Cell values keyed by column name (tabular records)
    pub fields: Option<HashMap<String, ScalarValue>>,
    /// Free-form entry text (journal records)
    pub text: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Record {
    /// Look up a cell by column name
    pub fn field(&self, column: &str) -> Option<&ScalarValue> {
        self.fields.as_ref().and_then(|f| f.get(column))
    }
}

/// A named collection of records sharing one schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    /// Column order as ingested
    pub columns: Vec<String>,
    pub column_types: HashMap<String, ColumnType>,
    pub rows: Vec<Record>,
    pub created_at: DateTime<Utc>,
}

impl Dataset {
    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.column_types.get(column).copied()
    }

    /// Numeric values of one column in row order, skipping non-numeric cells
    pub fn numeric_column(&self, column: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.field(column).and_then(ScalarValue::as_number))
            .collect()
    }

    /// The first `n` rows, for value-shape sampling
    pub fn sample_rows(&self, n: usize) -> &[Record] {
        &self.rows[..self.rows.len().min(n)]
    }

    /// Rows carrying free text instead of fields
    pub fn text_entries(&self) -> impl Iterator<Item = &Record> {
        self.rows.iter().filter(|r| r.text.is_some())
    }
}

/// Listing entry returned by the dataset store (rows fetched separately)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: String,
    pub name: String,
    pub columns: Vec<String>,
    pub column_types: HashMap<String, ColumnType>,
    pub uploaded_at: DateTime<Utc>,
}

// ========== Classification Models ==========

/// Coarse category assigned to a dataset or metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Financial,
    Sports,
    Health,
    Productivity,
    Food,
    Home,
    General,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Sports => "sports",
            Self::Health => "health",
            Self::Productivity => "productivity",
            Self::Food => "food",
            Self::Home => "home",
            Self::General => "general",
        }
    }

    /// All domains, in classification priority order
    pub fn all() -> &'static [Domain] {
        &[
            Self::Financial,
            Self::Sports,
            Self::Health,
            Self::Productivity,
            Self::Food,
            Self::Home,
            Self::General,
        ]
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "financial" | "finance" => Ok(Self::Financial),
            "sports" | "sport" => Ok(Self::Sports),
            "health" | "fitness" => Ok(Self::Health),
            "productivity" => Ok(Self::Productivity),
            "food" => Ok(Self::Food),
            "home" => Ok(Self::Home),
            "general" => Ok(Self::General),
            _ => Err(format!("Unknown domain: {}", s)),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of classifying one dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainClassification {
    pub domain: Domain,
    /// In `[0, 1]`; 0.5 base, +0.3 keyword indicator, +0.2 value indicator
    pub confidence: f64,
    /// Which signals fired, e.g. `"column:goals"`, `"values:financial"`
    pub indicators: BTreeSet<String>,
}

impl DomainClassification {
    pub fn general() -> Self {
        Self {
            domain: Domain::General,
            confidence: 0.5,
            indicators: BTreeSet::new(),
        }
    }
}

// ========== Extraction Models ==========

/// Overall tone of a text entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            _ => Err(format!("Unknown sentiment: {}", s)),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything extracted from one free-text entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedUnit {
    /// Canonical metric name → value, e.g. `{"goals": 2.0}`
    pub metrics: BTreeMap<String, f64>,
    /// Category name → matched keywords, e.g. `{"sports_performance": ["goal"]}`
    pub categories: BTreeMap<String, Vec<String>>,
    /// Entity type → matched keywords, e.g. `{"body_parts": ["foot"]}`
    pub entities: BTreeMap<String, Vec<String>>,
    pub sentiment: Sentiment,
    /// Literal policy constant per call path, not a computed measure
    pub confidence: f64,
}

impl ExtractedUnit {
    /// The degraded result for empty or unusable input
    pub fn empty() -> Self {
        Self {
            metrics: BTreeMap::new(),
            categories: BTreeMap::new(),
            entities: BTreeMap::new(),
            sentiment: Sentiment::Neutral,
            confidence: 0.0,
        }
    }
}

impl Default for ExtractedUnit {
    fn default() -> Self {
        Self::empty()
    }
}

/// A text record's extraction, paired with its provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextExtraction {
    pub record_id: String,
    pub timestamp: DateTime<Utc>,
    pub unit: ExtractedUnit,
}

// ========== Aggregation Models ==========

/// Direction of a metric over its trailing history window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ingested value in an aggregation's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: DateTime<Utc>,
    pub value: f64,
    /// Dataset the value came from
    pub source: String,
}

/// Running statistics for one metric within one domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricAggregation {
    pub domain: Domain,
    pub metric: String,
    pub total: f64,
    pub count: u64,
    /// Always `total / count`
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// `Stable` until at least 3 history points exist
    pub trend: Trend,
    pub history: Vec<HistoryPoint>,
}

impl MetricAggregation {
    /// Registry key, `domain:metric`
    pub fn key(&self) -> String {
        format!("{}:{}", self.domain, self.metric)
    }
}

// ========== Correlation Models ==========

/// Rationale used to pair two entities for correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationBasis {
    /// Same domain, shared numeric columns
    Domain,
    /// Shared numeric columns regardless of domain
    Column,
    /// Date-aligned series, or aligned trend behavior for metric pairs
    Time,
}

impl CorrelationBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Column => "column",
            Self::Time => "time",
        }
    }
}

impl fmt::Display for CorrelationBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strength label for a coefficient magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
}

impl CorrelationStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A discovered pairwise relationship; derived, recomputed per run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Dataset name or `domain:metric` key
    pub entity_a: String,
    pub entity_b: String,
    pub basis: CorrelationBasis,
    /// In `[-1, 1]`
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    /// Human-readable interpretation
    pub description: String,
}

// ========== Insight Models ==========

/// Urgency of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Numeric weight for ranking (higher = more urgent)
    pub fn weight(&self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What kind of observation an insight reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Domain performance summary from aggregated metrics
    Performance,
    /// A metric trending up or down
    Trend,
    /// An improvement area flagged in a text entry
    Improvement,
    /// Predominant mood across a dataset's entries
    Sentiment,
    /// A strong cross-entity relationship
    Correlation,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Trend => "trend",
            Self::Improvement => "improvement",
            Self::Sentiment => "sentiment",
            Self::Correlation => "correlation",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A prioritized, human-readable statement derived from the analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub confidence: f64,
    pub priority: Priority,
    pub recommendation: Option<String>,
    /// Metric names this insight draws on
    pub related_metrics: Vec<String>,
}

impl Insight {
    pub fn new(
        kind: InsightKind,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        confidence: f64,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            confidence,
            priority,
            recommendation: None,
            related_metrics: Vec::new(),
        }
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    pub fn with_related_metrics(mut self, metrics: Vec<String>) -> Self {
        self.related_metrics = metrics;
        self
    }

    /// Rank score: priority weight × confidence
    pub fn score(&self) -> f64 {
        f64::from(self.priority.weight()) * self.confidence
    }
}

// ========== Report Models ==========

/// Suggested visualization for the report consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Pie => "pie",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSuggestion {
    pub kind: ChartKind,
    pub title: String,
    pub metric: Option<String>,
    pub domain: Option<Domain>,
    pub reason: String,
}

/// Headline counts for one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_datasets: usize,
    pub total_records: usize,
    /// Dataset count per classified domain
    pub domains: BTreeMap<Domain, usize>,
    pub last_updated: DateTime<Utc>,
}

/// The single result object produced for consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: SummaryStats,
    pub insights: Vec<Insight>,
    pub cross_dataset_insights: Vec<CorrelationResult>,
    pub recommendations: Vec<String>,
    pub charts: Vec<ChartSuggestion>,
}

/// A dataset bundled with its classification and text extractions, as
/// assembled by the pipeline for the aggregation/correlation stages
#[derive(Debug, Clone)]
pub struct AnalyzedDataset {
    pub dataset: Dataset,
    pub classification: DomainClassification,
    pub extractions: Vec<TextExtraction>,
}

impl AnalyzedDataset {
    pub fn domain(&self) -> Domain {
        self.classification.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_value_as_number() {
        assert_eq!(ScalarValue::Number(2.5).as_number(), Some(2.5));
        assert_eq!(ScalarValue::Text("2.5".to_string()).as_number(), None);
        assert_eq!(ScalarValue::Bool(true).as_number(), None);
        assert_eq!(ScalarValue::Null.as_number(), None);
    }

    #[test]
    fn test_scalar_value_untagged_serde() {
        let json = serde_json::json!([3.0, "three", true, null]);
        let values: Vec<ScalarValue> = serde_json::from_value(json).unwrap();
        assert_eq!(values[0], ScalarValue::Number(3.0));
        assert_eq!(values[1], ScalarValue::Text("three".to_string()));
        assert_eq!(values[2], ScalarValue::Bool(true));
        assert_eq!(values[3], ScalarValue::Null);
    }

    #[test]
    fn test_domain_round_trip() {
        for domain in Domain::all() {
            assert_eq!(domain.as_str().parse::<Domain>().unwrap(), *domain);
        }
    }

    #[test]
    fn test_priority_weight_ordering() {
        assert!(Priority::High.weight() > Priority::Medium.weight());
        assert!(Priority::Medium.weight() > Priority::Low.weight());
    }

    #[test]
    fn test_insight_builder() {
        let insight = Insight::new(
            InsightKind::Trend,
            "Steps trending up",
            "steps increased over the last entries",
            Priority::Medium,
            0.8,
        )
        .with_recommendation("Keep the streak going")
        .with_related_metrics(vec!["steps".to_string()]);

        assert_eq!(insight.recommendation.as_deref(), Some("Keep the streak going"));
        assert_eq!(insight.related_metrics, vec!["steps"]);
        assert!((insight.score() - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_extracted_unit_default_is_neutral() {
        let unit = ExtractedUnit::empty();
        assert!(unit.metrics.is_empty());
        assert_eq!(unit.sentiment, Sentiment::Neutral);
        assert_eq!(unit.confidence, 0.0);
    }

    #[test]
    fn test_dataset_numeric_column_skips_non_numbers() {
        let mut fields_a = HashMap::new();
        fields_a.insert("goals".to_string(), ScalarValue::Number(2.0));
        let mut fields_b = HashMap::new();
        fields_b.insert("goals".to_string(), ScalarValue::Text("n/a".to_string()));

        let dataset = Dataset {
            id: "d1".to_string(),
            name: "matches".to_string(),
            columns: vec!["goals".to_string()],
            column_types: HashMap::from([("goals".to_string(), ColumnType::Number)]),
            rows: vec![
                Record {
                    id: "r1".to_string(),
                    dataset_id: "d1".to_string(),
                    fields: Some(fields_a),
                    text: None,
                    timestamp: Utc::now(),
                },
                Record {
                    id: "r2".to_string(),
                    dataset_id: "d1".to_string(),
                    fields: Some(fields_b),
                    text: None,
                    timestamp: Utc::now(),
                },
            ],
            created_at: Utc::now(),
        };

        assert_eq!(dataset.numeric_column("goals"), vec![2.0]);
    }
}
