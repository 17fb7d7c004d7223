//! Analyze command: run the full pipeline over local files and print the report

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use weave_core::import::{dataset_from_csv, dataset_from_text};
use weave_core::models::{AnalysisReport, Dataset};
use weave_core::{AnalysisPipeline, MemoryStore, WeaveConfig};

use super::truncate;

/// Run the analysis pipeline over the given files and print the report.
///
/// CSV files become tabular datasets; everything else is treated as
/// journal text with one entry per blank-line-separated block.
pub async fn cmd_analyze(files: &[PathBuf], no_model: bool, format: &str) -> Result<()> {
    let json = format == "json";
    tracing::debug!(files = files.len(), no_model, "starting analysis");

    let mut store = MemoryStore::new();
    for path in files {
        let dataset = load_dataset(path)?;
        if !json {
            println!("📥 {} ({} records)", dataset.name, dataset.rows.len());
        }
        store.insert(dataset);
    }

    let pipeline = if no_model {
        AnalysisPipeline::new()
    } else {
        let config = WeaveConfig::load().context("Failed to load configuration")?;
        if !json && config.model.backend == "none" {
            println!("   💡 Tip: Set WEAVE_MODEL_BACKEND=ollama for model-assisted extraction");
        }
        AnalysisPipeline::from_config(&config)
    };

    let report = pipeline.run(&store).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Load a dataset from a local file, choosing the importer by extension.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string();

    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        dataset_from_csv(file, &name)
            .with_context(|| format!("Failed to parse {}", path.display()))
    } else {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(dataset_from_text(&content, &name))
    }
}

fn print_report(report: &AnalysisReport) {
    println!();
    println!("📊 Analysis Summary");
    println!("   ─────────────────────────────");
    println!("   Datasets: {}", report.summary.total_datasets);
    println!("   Records:  {}", report.summary.total_records);
    for (domain, count) in &report.summary.domains {
        println!("   {:>10}: {} dataset(s)", domain.to_string(), count);
    }

    if !report.insights.is_empty() {
        println!();
        println!("💡 Insights");
        println!("   ─────────────────────────────");
        for insight in &report.insights {
            println!("   [{}] {}", insight.priority, insight.title);
            println!("        {}", truncate(&insight.description, 100));
        }
    }

    if !report.cross_dataset_insights.is_empty() {
        println!();
        println!("🔗 Correlations");
        println!("   ─────────────────────────────");
        for correlation in &report.cross_dataset_insights {
            println!(
                "   {} ↔ {} ({:+.2}, {})",
                correlation.entity_a,
                correlation.entity_b,
                correlation.coefficient,
                correlation.strength
            );
        }
    }

    if !report.recommendations.is_empty() {
        println!();
        println!("✅ Recommendations");
        println!("   ─────────────────────────────");
        for (i, recommendation) in report.recommendations.iter().enumerate() {
            println!("   {}. {}", i + 1, recommendation);
        }
    }

    if !report.charts.is_empty() {
        println!();
        println!("📈 Suggested Charts");
        println!("   ─────────────────────────────");
        for chart in &report.charts {
            println!("   {:>4}  {}", chart.kind.to_string(), chart.title);
        }
    }
}
