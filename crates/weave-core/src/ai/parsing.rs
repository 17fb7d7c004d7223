//! JSON parsing helpers for text-model replies
//!
//! Model replies often wrap the JSON payload in prose. These helpers slice
//! the first `{` to the last `}` before deserializing, and tolerate missing
//! fields rather than failing an extraction over an incomplete reply.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{ExtractedUnit, Sentiment};

/// Confidence assigned when the reply does not carry one
const MODEL_CONFIDENCE: f64 = 0.8;

/// Lenient deserialize target; every field optional
#[derive(Debug, Default, Deserialize)]
struct RawExtraction {
    #[serde(default)]
    metrics: BTreeMap<String, f64>,
    #[serde(default)]
    categories: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    entities: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    sentiment: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Parse an extraction reply into an `ExtractedUnit`
pub fn parse_extraction(response: &str) -> Result<ExtractedUnit> {
    let json = json_span(response)?;
    let raw: RawExtraction = serde_json::from_str(json).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid JSON from model: {} | Raw: {}",
            e,
            truncated(json)
        ))
    })?;

    let sentiment = raw
        .sentiment
        .as_deref()
        .and_then(|s| s.parse::<Sentiment>().ok())
        .unwrap_or_default();

    Ok(ExtractedUnit {
        metrics: raw.metrics,
        categories: raw.categories,
        entities: raw.entities,
        sentiment,
        confidence: raw.confidence.unwrap_or(MODEL_CONFIDENCE).clamp(0.0, 1.0),
    })
}

/// The first `{` .. last `}` span of a reply
fn json_span(response: &str) -> Result<&str> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(&response[s..=e]),
        _ => Err(Error::InvalidData(format!(
            "No JSON found in model reply | Raw: {}",
            truncated(response)
        ))),
    }
}

fn truncated(s: &str) -> String {
    if s.len() > 200 {
        format!("{}...", &s[..200])
    } else {
        s.to_string()
    }
}
