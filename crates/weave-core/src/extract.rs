//! Unit extraction from free-form text
//!
//! Turns a journal-style entry into typed metrics, entities, categories,
//! and sentiment. Two regex passes find `<number> <unit>` metrics: a broad
//! pass that normalizes any unit token, and a narrower pass over known
//! domain units that can overwrite the first. Entity, category, and
//! sentiment matching is coarse (case-insensitive substring tests over
//! fixed keyword lists); tests pin the coarse behavior.
//!
//! Extraction never fails: empty or unusable text degrades to an empty
//! unit with zero confidence.

use std::collections::BTreeMap;
use std::time::Duration;

use regex::Regex;

use crate::ai::{TextModelBackend, TextModelClient};
use crate::models::{ExtractedUnit, Sentiment};

/// Confidence reported when the rule-based path is the chosen path
const CONFIDENCE_LOCAL: f64 = 0.85;

/// Confidence reported when the rule-based path is a fallback after the
/// model backend was unavailable or timed out
const CONFIDENCE_FALLBACK: f64 = 0.7;

/// Raw unit token → canonical metric name (first pass). Unmapped tokens
/// pass through as their lowercased literal.
const UNIT_ALIASES: &[(&str, &str)] = &[
    ("goal", "goals"),
    ("goals", "goals"),
    ("assist", "assists"),
    ("assists", "assists"),
    ("save", "saves"),
    ("saves", "saves"),
    ("shot", "shots"),
    ("shots", "shots"),
    ("point", "points"),
    ("points", "points"),
    ("pts", "points"),
    ("mi", "miles"),
    ("mile", "miles"),
    ("miles", "miles"),
    ("km", "kilometers"),
    ("kms", "kilometers"),
    ("kilometer", "kilometers"),
    ("kilometers", "kilometers"),
    ("min", "minutes"),
    ("mins", "minutes"),
    ("minute", "minutes"),
    ("minutes", "minutes"),
    ("hr", "hours"),
    ("hrs", "hours"),
    ("hour", "hours"),
    ("hours", "hours"),
    ("step", "steps"),
    ("steps", "steps"),
    ("cal", "calories"),
    ("cals", "calories"),
    ("calorie", "calories"),
    ("calories", "calories"),
    ("rep", "reps"),
    ("reps", "reps"),
    ("set", "sets"),
    ("sets", "sets"),
    ("lb", "pounds"),
    ("lbs", "pounds"),
    ("pound", "pounds"),
    ("pounds", "pounds"),
    ("kg", "kilograms"),
    ("kgs", "kilograms"),
    ("kilogram", "kilograms"),
    ("kilograms", "kilograms"),
    ("dollar", "amount"),
    ("dollars", "amount"),
    ("usd", "amount"),
    ("bucks", "amount"),
    ("game", "games"),
    ("games", "games"),
    ("match", "matches"),
    ("matches", "matches"),
    ("task", "tasks"),
    ("tasks", "tasks"),
    ("meeting", "meetings"),
    ("meetings", "meetings"),
    ("email", "emails"),
    ("emails", "emails"),
    ("page", "pages"),
    ("pages", "pages"),
    ("glass", "glasses"),
    ("glasses", "glasses"),
    ("cup", "cups"),
    ("cups", "cups"),
    ("liter", "liters"),
    ("liters", "liters"),
    ("litre", "liters"),
    ("litres", "liters"),
    ("meal", "meals"),
    ("meals", "meals"),
    ("workout", "workouts"),
    ("workouts", "workouts"),
];

/// Containment keywords for the second-pass span → canonical metric name
const DOMAIN_UNIT_KEYWORDS: &[(&str, &str)] = &[
    ("goal", "goals"),
    ("assist", "assists"),
    ("save", "saves"),
    ("shot", "shots"),
    ("point", "points"),
    ("mile", "miles"),
    ("kilometer", "kilometers"),
    ("km", "kilometers"),
    ("minute", "minutes"),
    ("min", "minutes"),
    ("hour", "hours"),
    ("hr", "hours"),
    ("step", "steps"),
    ("calorie", "calories"),
    ("rep", "reps"),
    ("task", "tasks"),
    ("meeting", "meetings"),
    ("workout", "workouts"),
];

/// Entity type → keyword list; matched by substring against lowered text
const ENTITY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "body_parts",
        &[
            "foot",
            "feet",
            "leg",
            "knee",
            "ankle",
            "arm",
            "shoulder",
            "back",
            "hamstring",
            "calf",
            "hip",
            "wrist",
            "neck",
        ],
    ),
    (
        "skills",
        &[
            "shooting",
            "passing",
            "dribbling",
            "defending",
            "tackling",
            "sprinting",
            "heading",
            "footwork",
            "accuracy",
            "endurance",
        ],
    ),
    (
        "activities",
        &[
            "running", "run", "walking", "walk", "swimming", "swim", "cycling", "training",
            "practice", "workout", "yoga", "gym", "hike",
        ],
    ),
    (
        "measurements",
        &[
            "weight",
            "height",
            "distance",
            "pace",
            "speed",
            "heart rate",
            "blood pressure",
            "temperature",
        ],
    ),
    (
        "time_periods",
        &[
            "morning",
            "afternoon",
            "evening",
            "night",
            "today",
            "yesterday",
            "daily",
            "weekly",
            "week",
            "month",
        ],
    ),
    (
        "food_items",
        &[
            "breakfast",
            "lunch",
            "dinner",
            "snack",
            "coffee",
            "water",
            "protein",
            "salad",
            "chicken",
            "rice",
            "fruit",
            "vegetable",
        ],
    ),
    (
        "home_items",
        &[
            "kitchen",
            "bathroom",
            "bedroom",
            "garage",
            "garden",
            "lawn",
            "laundry",
            "furniture",
            "cleaning",
            "repair",
        ],
    ),
];

/// Category → keyword list; same substring semantics as entities
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "sports_performance",
        &[
            "goal",
            "assist",
            "score",
            "win",
            "match",
            "game",
            "team",
            "tournament",
            "practice",
        ],
    ),
    (
        "health_metrics",
        &[
            "steps", "calories", "sleep", "weight", "heart", "workout", "exercise",
        ],
    ),
    (
        "improvement_areas",
        &[
            "better", "improve", "needs", "work on", "weak", "focus", "sharpen",
        ],
    ),
    (
        "activities",
        &["run", "walk", "swim", "gym", "training", "yoga", "hike", "ride"],
    ),
    (
        "measurements",
        &["miles", "km", "kg", "lbs", "minutes", "hours", "meters"],
    ),
    (
        "food",
        &[
            "ate", "meal", "breakfast", "lunch", "dinner", "snack", "drank",
        ],
    ),
    (
        "home",
        &["clean", "fix", "repair", "organize", "mow", "paint"],
    ),
];

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "better",
    "best",
    "improved",
    "improving",
    "win",
    "won",
    "strong",
    "happy",
    "excellent",
    "progress",
    "amazing",
    "solid",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "worse",
    "worst",
    "poor",
    "weak",
    "tired",
    "sore",
    "injured",
    "injury",
    "hurt",
    "loss",
    "lost",
    "failed",
    "struggled",
    "sick",
];

/// Rule-based extractor for free-text entries
pub struct UnitExtractor {
    /// Broad `<number> <word>` pass
    number_unit: Regex,
    /// Narrow pass over known domain units; allows a missing space
    domain_unit: Regex,
}

impl UnitExtractor {
    pub fn new() -> Self {
        Self {
            number_unit: Regex::new(r"(\d+(?:\.\d+)?)\s+([a-z]+)").expect("valid regex"),
            domain_unit: Regex::new(
                r"(\d+(?:\.\d+)?)\s*(goals?|assists?|saves?|shots?|points?|miles?|kilometers?|km|minutes?|mins?|hours?|hrs?|steps?|calories?|reps?|tasks?|meetings?|workouts?)",
            )
            .expect("valid regex"),
        }
    }

    /// Extract metrics, entities, categories, and sentiment from one text
    /// entry. Pure; never fails. Empty input returns the degraded unit.
    pub fn extract(&self, text: &str) -> ExtractedUnit {
        if text.trim().is_empty() {
            return ExtractedUnit::empty();
        }

        let lower = text.to_lowercase();
        let metrics = self.extract_metrics(&lower);
        let categories = match_keyword_sets(&lower, CATEGORY_KEYWORDS);
        let entities = match_keyword_sets(&lower, ENTITY_KEYWORDS);
        let sentiment = score_sentiment(&lower);

        tracing::debug!(
            metrics = metrics.len(),
            sentiment = %sentiment,
            "extracted units from text"
        );

        ExtractedUnit {
            metrics,
            categories,
            entities,
            sentiment,
            confidence: CONFIDENCE_LOCAL,
        }
    }

    /// Extract via the external model when one is configured and healthy,
    /// falling back to the rule-based path on unavailability, error, or
    /// timeout. The fallback reports a lower confidence than a plain
    /// local extraction.
    pub async fn extract_with_model(
        &self,
        text: &str,
        client: Option<&TextModelClient>,
        timeout: Duration,
    ) -> ExtractedUnit {
        let Some(client) = client else {
            return self.extract(text);
        };
        if text.trim().is_empty() {
            return ExtractedUnit::empty();
        }

        match tokio::time::timeout(timeout, client.health_check()).await {
            Ok(true) => {}
            Ok(false) | Err(_) => {
                tracing::warn!(
                    host = client.host(),
                    "model backend unavailable, using rule-based extraction"
                );
                return self.fallback(text);
            }
        }

        match tokio::time::timeout(timeout, client.extract_units(text)).await {
            Ok(Ok(unit)) => unit,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "model extraction failed, using rule-based extraction");
                self.fallback(text)
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = timeout.as_secs(),
                    "model extraction timed out, using rule-based extraction"
                );
                self.fallback(text)
            }
        }
    }

    fn fallback(&self, text: &str) -> ExtractedUnit {
        let mut unit = self.extract(text);
        if unit.confidence > 0.0 {
            unit.confidence = CONFIDENCE_FALLBACK;
        }
        unit
    }

    /// Two-pass metric scan. Later matches overwrite earlier ones for the
    /// same canonical name, and the second pass overwrites the first.
    fn extract_metrics(&self, lower: &str) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        for cap in self.number_unit.captures_iter(lower) {
            let Ok(value) = cap[1].parse::<f64>() else {
                continue;
            };
            metrics.insert(normalize_unit(&cap[2]), value);
        }

        for cap in self.domain_unit.captures_iter(lower) {
            let Ok(value) = cap[1].parse::<f64>() else {
                continue;
            };
            let span = &cap[2];
            for (keyword, canonical) in DOMAIN_UNIT_KEYWORDS {
                if span.contains(keyword) {
                    metrics.insert((*canonical).to_string(), value);
                }
            }
        }

        metrics
    }
}

impl Default for UnitExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_unit(raw: &str) -> String {
    UNIT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == raw)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| raw.to_lowercase())
}

/// Substring-match every keyword set against the lowered text, keeping
/// only sets with at least one hit. Matches are reported in keyword-list
/// order.
fn match_keyword_sets(
    lower: &str,
    sets: &[(&str, &[&str])],
) -> BTreeMap<String, Vec<String>> {
    let mut matched = BTreeMap::new();
    for (name, keywords) in sets {
        let hits: Vec<String> = keywords
            .iter()
            .filter(|keyword| lower.contains(*keyword))
            .map(|keyword| (*keyword).to_string())
            .collect();
        if !hits.is_empty() {
            matched.insert((*name).to_string(), hits);
        }
    }
    matched
}

fn score_sentiment(lower: &str) -> Sentiment {
    let positive: usize = POSITIVE_WORDS
        .iter()
        .map(|word| lower.matches(word).count())
        .sum();
    let negative: usize = NEGATIVE_WORDS
        .iter()
        .map(|word| lower.matches(word).count())
        .sum();

    if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_empty_text_degrades_to_defaults() {
        let extractor = UnitExtractor::new();
        for text in ["", "   ", "\n\t"] {
            let unit = extractor.extract(text);
            assert!(unit.metrics.is_empty());
            assert!(unit.entities.is_empty());
            assert_eq!(unit.sentiment, Sentiment::Neutral);
            assert_eq!(unit.confidence, 0.0);
        }
    }

    #[test]
    fn test_extract_number_unit_pairs() {
        let extractor = UnitExtractor::new();
        let unit = extractor.extract("2 goals and 3.5 miles this morning");
        assert_eq!(unit.metrics.get("goals"), Some(&2.0));
        assert_eq!(unit.metrics.get("miles"), Some(&3.5));
    }

    #[test]
    fn test_extract_normalizes_unit_aliases() {
        let extractor = UnitExtractor::new();
        let unit = extractor.extract("5 km in 45 mins");
        assert_eq!(unit.metrics.get("kilometers"), Some(&5.0));
        assert_eq!(unit.metrics.get("minutes"), Some(&45.0));
    }

    #[test]
    fn test_extract_unmapped_unit_passes_through() {
        let extractor = UnitExtractor::new();
        let unit = extractor.extract("painted 3 fences today");
        assert_eq!(unit.metrics.get("fences"), Some(&3.0));
    }

    #[test]
    fn test_extract_last_occurrence_wins() {
        let extractor = UnitExtractor::new();
        let unit = extractor.extract("2 goals in the first half, 3 goals total");
        assert_eq!(unit.metrics.get("goals"), Some(&3.0));
    }

    #[test]
    fn test_extract_second_pass_catches_compact_spans() {
        // "7miles" has no space, so only the domain-unit pass sees it and
        // it overwrites the earlier spaced match
        let extractor = UnitExtractor::new();
        let unit = extractor.extract("2 miles before lunch, 7miles total");
        assert_eq!(unit.metrics.get("miles"), Some(&7.0));
    }

    #[test]
    fn test_extract_substring_matching_is_coarse() {
        // "assistant" contains "assist"; the narrow pass maps it anyway
        let extractor = UnitExtractor::new();
        let unit = extractor.extract("met with 5 assistants");
        assert_eq!(unit.metrics.get("assists"), Some(&5.0));
    }

    #[test]
    fn test_extract_entities_and_categories() {
        let extractor = UnitExtractor::new();
        let unit =
            extractor.extract("July 2nd - 2 goals, 2 assists. 7 miles. Left foot needs to be better.");

        assert_eq!(unit.metrics.get("goals"), Some(&2.0));
        assert_eq!(unit.metrics.get("assists"), Some(&2.0));
        assert_eq!(unit.metrics.get("miles"), Some(&7.0));
        assert_eq!(
            unit.entities.get("body_parts"),
            Some(&vec!["foot".to_string()])
        );
        let improvement = unit.categories.get("improvement_areas").unwrap();
        assert!(improvement.contains(&"better".to_string()));
        let sports = unit.categories.get("sports_performance").unwrap();
        assert!(sports.contains(&"goal".to_string()));
    }

    #[test]
    fn test_extract_sentiment_counts() {
        let extractor = UnitExtractor::new();
        assert_eq!(
            extractor.extract("great session, feeling strong").sentiment,
            Sentiment::Positive
        );
        assert_eq!(
            extractor.extract("tired and sore after the loss").sentiment,
            Sentiment::Negative
        );
        assert_eq!(
            extractor.extract("logged 4 miles").sentiment,
            Sentiment::Neutral
        );
        // Equal counts stay neutral
        assert_eq!(
            extractor.extract("good run but tired").sentiment,
            Sentiment::Neutral
        );
    }

    #[test]
    fn test_extract_confidence_is_policy_constant() {
        let extractor = UnitExtractor::new();
        let unit = extractor.extract("2 goals");
        assert_eq!(unit.confidence, CONFIDENCE_LOCAL);
    }

    #[tokio::test]
    async fn test_extract_with_model_falls_back_when_unavailable() {
        let extractor = UnitExtractor::new();
        let client = TextModelClient::mock_unhealthy();
        let unit = extractor
            .extract_with_model("2 goals", Some(&client), Duration::from_millis(200))
            .await;
        assert_eq!(unit.metrics.get("goals"), Some(&2.0));
        assert_eq!(unit.confidence, CONFIDENCE_FALLBACK);
    }

    #[tokio::test]
    async fn test_extract_with_model_none_uses_local_path() {
        let extractor = UnitExtractor::new();
        let unit = extractor
            .extract_with_model("2 goals", None, Duration::from_millis(200))
            .await;
        assert_eq!(unit.confidence, CONFIDENCE_LOCAL);
    }
}
