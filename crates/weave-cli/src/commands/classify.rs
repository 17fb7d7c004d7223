//! Classify command: show the domain classification for a single file

use std::path::Path;

use anyhow::Result;
use weave_core::AnalysisPipeline;

use super::load_dataset;

pub async fn cmd_classify(file: &Path, format: &str) -> Result<()> {
    let dataset = load_dataset(file)?;
    let records = dataset.rows.len();

    // Runs extraction first so free-text files classify from their entries,
    // not just their (absent) columns.
    let analyzed = AnalysisPipeline::new().analyze_dataset(dataset).await;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&analyzed.classification)?);
        return Ok(());
    }

    println!();
    println!("🏷️  {}", analyzed.dataset.name);
    println!("   ─────────────────────────────");
    println!("   Domain:     {}", analyzed.classification.domain);
    println!("   Confidence: {:.2}", analyzed.classification.confidence);
    println!("   Records:    {}", records);

    if !analyzed.classification.indicators.is_empty() {
        let indicators: Vec<&str> = analyzed
            .classification
            .indicators
            .iter()
            .map(String::as_str)
            .collect();
        println!("   Indicators: {}", indicators.join(", "));
    }

    Ok(())
}
