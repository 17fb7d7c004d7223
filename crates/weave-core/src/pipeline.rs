//! Analysis pipeline
//!
//! Orchestrates one run over a dataset store: fetch, extract, classify,
//! aggregate, correlate, rank. Stages execute sequentially; the only awaited
//! points are store reads and the optional text-model call inside extraction.
//! Store failures surface as errors. An empty store short-circuits to an
//! onboarding report without running the stages.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use crate::ai::TextModelClient;
use crate::aggregate::MetricRegistry;
use crate::classify::{self, DomainClassifier};
use crate::config::WeaveConfig;
use crate::correlate::CorrelationEngine;
use crate::error::Result;
use crate::extract::UnitExtractor;
use crate::insights::{build_recommendations, rank, InsightBuilder};
use crate::models::{
    AnalysisReport, AnalyzedDataset, Dataset, DatasetSummary, Domain, DomainClassification,
    ExtractedUnit, Record, SummaryStats, TextExtraction,
};
use crate::store::DatasetStore;

/// Bound on each text-model call when no config supplies one
const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(30);

/// Returned instead of analysis output when the store holds no datasets
const ONBOARDING_RECOMMENDATIONS: &[&str] = &[
    "Upload a CSV file to get started with automatic domain detection",
    "Add a journal or notes file to extract metrics from free-form text",
    "Upload at least two datasets to unlock cross-dataset correlations",
];

/// Runs the full analysis flow and assembles the report
pub struct AnalysisPipeline {
    extractor: UnitExtractor,
    classifier: DomainClassifier,
    correlation_engine: CorrelationEngine,
    insight_builder: InsightBuilder,
    model: Option<TextModelClient>,
    model_timeout: Duration,
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisPipeline {
    /// Rule-based pipeline with no text-model backend
    pub fn new() -> Self {
        Self {
            extractor: UnitExtractor::new(),
            classifier: DomainClassifier::new(),
            correlation_engine: CorrelationEngine::new(),
            insight_builder: InsightBuilder::new(),
            model: None,
            model_timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }

    /// Pipeline with a text-model client for free-text extraction
    pub fn with_model(client: TextModelClient, timeout: Duration) -> Self {
        let mut pipeline = Self::new();
        pipeline.model = Some(client);
        pipeline.model_timeout = timeout;
        pipeline
    }

    /// Pipeline configured from resolved settings (backend choice + timeout)
    pub fn from_config(config: &WeaveConfig) -> Self {
        let mut pipeline = Self::new();
        pipeline.model = TextModelClient::from_config(&config.model);
        pipeline.model_timeout = config.model.timeout;
        pipeline
    }

    /// Run the full analysis over every dataset in the store
    pub async fn run(&self, store: &dyn DatasetStore) -> Result<AnalysisReport> {
        let summaries = store.list_datasets().await?;
        if summaries.is_empty() {
            info!("store is empty, returning onboarding report");
            return Ok(onboarding_report());
        }

        let mut analyzed = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let rows = store.fetch_rows(&summary.id).await?;
            let dataset = materialize(summary, rows);
            analyzed.push(self.analyze_dataset(dataset).await);
        }

        Ok(self.report(&analyzed))
    }

    /// Extract units from text entries and classify one dataset
    pub async fn analyze_dataset(&self, dataset: Dataset) -> AnalyzedDataset {
        let mut extractions = Vec::new();
        for record in dataset.text_entries() {
            let Some(text) = record.text.as_deref() else {
                continue;
            };
            let unit = self
                .extractor
                .extract_with_model(text, self.model.as_ref(), self.model_timeout)
                .await;
            extractions.push(TextExtraction {
                record_id: record.id.clone(),
                timestamp: record.timestamp,
                unit,
            });
        }

        let classification = self.classify_dataset(&dataset, &extractions);
        debug!(
            dataset = %dataset.name,
            domain = %classification.domain,
            confidence = classification.confidence,
            extractions = extractions.len(),
            "analyzed dataset"
        );

        AnalyzedDataset {
            dataset,
            classification,
            extractions,
        }
    }

    /// Preprocessed metadata wins over text votes, which win over the
    /// column-based pass
    fn classify_dataset(
        &self,
        dataset: &Dataset,
        extractions: &[TextExtraction],
    ) -> DomainClassification {
        if classify::is_preprocessed(&dataset.columns) {
            return match dataset.rows.first() {
                Some(first) => self.classifier.classify_from_metadata(first),
                None => DomainClassification::general(),
            };
        }
        if !extractions.is_empty() {
            let units: Vec<ExtractedUnit> =
                extractions.iter().map(|e| e.unit.clone()).collect();
            return self.classifier.classify_text(&units);
        }
        self.classifier
            .classify(&dataset.columns, &dataset.column_types, &dataset.rows)
    }

    fn report(&self, datasets: &[AnalyzedDataset]) -> AnalysisReport {
        let mut registry = MetricRegistry::default();
        for analyzed in datasets {
            registry.ingest_dataset(&analyzed.dataset, analyzed.domain());
            for extraction in &analyzed.extractions {
                registry.ingest_extraction(analyzed.domain(), extraction, &analyzed.dataset.id);
            }
        }
        let aggregations = registry.snapshot();

        // Dataset-level correlations first, then the metric-pair heuristic;
        // each list keeps its own magnitude ordering
        let mut correlations = self.correlation_engine.correlate(datasets);
        correlations.extend(self.correlation_engine.correlate_metrics(&aggregations));

        let insights = rank(
            self.insight_builder
                .build(datasets, &aggregations, &correlations),
        );

        let domain_set: BTreeSet<Domain> = datasets.iter().map(AnalyzedDataset::domain).collect();
        let domains: Vec<Domain> = domain_set.iter().copied().collect();
        let recommendations = build_recommendations(&insights, &correlations, &domains);
        let charts = self.insight_builder.suggest_charts(&aggregations, &domain_set);

        info!(
            datasets = datasets.len(),
            metrics = aggregations.len(),
            correlations = correlations.len(),
            insights = insights.len(),
            "analysis complete"
        );

        AnalysisReport {
            summary: summarize(datasets),
            insights,
            cross_dataset_insights: correlations,
            recommendations,
            charts,
        }
    }
}

/// Join a store listing with its fetched rows
fn materialize(summary: DatasetSummary, rows: Vec<Record>) -> Dataset {
    Dataset {
        id: summary.id,
        name: summary.name,
        columns: summary.columns,
        column_types: summary.column_types,
        rows,
        created_at: summary.uploaded_at,
    }
}

fn summarize(datasets: &[AnalyzedDataset]) -> SummaryStats {
    let mut domains = BTreeMap::new();
    for analyzed in datasets {
        *domains.entry(analyzed.domain()).or_insert(0) += 1;
    }

    SummaryStats {
        total_datasets: datasets.len(),
        total_records: datasets.iter().map(|a| a.dataset.rows.len()).sum(),
        domains,
        last_updated: Utc::now(),
    }
}

fn onboarding_report() -> AnalysisReport {
    AnalysisReport {
        summary: SummaryStats {
            total_datasets: 0,
            total_records: 0,
            domains: BTreeMap::new(),
            last_updated: Utc::now(),
        },
        insights: Vec::new(),
        cross_dataset_insights: Vec::new(),
        recommendations: ONBOARDING_RECOMMENDATIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        charts: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::import::{dataset_from_csv, dataset_from_text};
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl DatasetStore for FailingStore {
        async fn list_datasets(&self) -> Result<Vec<DatasetSummary>> {
            Err(Error::Store("connection refused".to_string()))
        }

        async fn fetch_rows(&self, _dataset_id: &str) -> Result<Vec<Record>> {
            Err(Error::Store("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_run_empty_store_returns_onboarding_report() {
        let store = MemoryStore::new();
        let report = AnalysisPipeline::new().run(&store).await.unwrap();

        assert_eq!(report.summary.total_datasets, 0);
        assert!(report.insights.is_empty());
        assert!(report.charts.is_empty());
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("CSV")));
    }

    #[tokio::test]
    async fn test_run_surfaces_store_errors() {
        let result = AnalysisPipeline::new().run(&FailingStore).await;
        assert!(matches!(result, Err(Error::Store(_))));
    }

    #[tokio::test]
    async fn test_run_classifies_and_aggregates_csv() {
        let csv = "date,goals,assists\n2024-03-01,2,1\n2024-03-08,3,2\n2024-03-15,1,0\n";
        let dataset = dataset_from_csv(csv.as_bytes(), "matches").unwrap();

        let mut store = MemoryStore::new();
        store.insert(dataset);

        let report = AnalysisPipeline::new().run(&store).await.unwrap();

        assert_eq!(report.summary.total_datasets, 1);
        assert_eq!(report.summary.total_records, 3);
        assert_eq!(report.summary.domains.get(&Domain::Sports), Some(&1));
        assert!(!report.insights.is_empty());
        assert!(!report.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_dataset_extracts_and_classifies_journal_text() {
        let dataset = dataset_from_text("Scored 2 goals and 1 assist today.", "journal");
        let analyzed = AnalysisPipeline::new().analyze_dataset(dataset).await;

        assert_eq!(analyzed.domain(), Domain::Sports);
        assert_eq!(analyzed.extractions.len(), 1);
        assert_eq!(
            analyzed.extractions[0].unit.metrics.get("goals"),
            Some(&2.0)
        );
    }

    #[tokio::test]
    async fn test_classify_dataset_prefers_preprocessed_metadata() {
        let csv = "domain,metrics,confidence\nhealth,steps,0.9\n";
        let dataset = dataset_from_csv(csv.as_bytes(), "exported").unwrap();
        let analyzed = AnalysisPipeline::new().analyze_dataset(dataset).await;

        assert_eq!(analyzed.domain(), Domain::Health);
    }
}
