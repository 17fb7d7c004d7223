//! Extract command: preview rule-based unit extraction for one text entry

use anyhow::Result;
use weave_core::UnitExtractor;

pub fn cmd_extract(text: &str, format: &str) -> Result<()> {
    let unit = UnitExtractor::new().extract(text);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&unit)?);
        return Ok(());
    }

    println!();
    println!("🔬 Extraction");
    println!("   ─────────────────────────────");
    if unit.metrics.is_empty() {
        println!("   No metrics found");
    } else {
        for (metric, value) in &unit.metrics {
            println!("   {:>12}: {}", metric, value);
        }
    }

    if !unit.categories.is_empty() {
        println!();
        println!("   Categories:");
        for (category, keywords) in &unit.categories {
            println!("     {} ({})", category, keywords.join(", "));
        }
    }

    if !unit.entities.is_empty() {
        println!();
        println!("   Entities:");
        for (entity, keywords) in &unit.entities {
            println!("     {} ({})", entity, keywords.join(", "));
        }
    }

    println!();
    println!("   Sentiment:  {}", unit.sentiment);
    println!("   Confidence: {:.2}", unit.confidence);

    Ok(())
}
