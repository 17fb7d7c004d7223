//! Insight generation
//!
//! Deterministic rules that turn aggregations, correlations, and extracted
//! text units into `Insight` values. Phrasing is fixed so tests can pin
//! output; the ranker decides final order.

use std::collections::BTreeSet;

use crate::models::{
    AnalyzedDataset, ChartKind, ChartSuggestion, CorrelationResult, Domain, Insight, InsightKind,
    MetricAggregation, Priority, Sentiment, Trend,
};

const PERFORMANCE_CONFIDENCE: f64 = 0.9;
const TREND_CONFIDENCE: f64 = 0.8;
const IMPROVEMENT_CONFIDENCE: f64 = 0.85;
const SENTIMENT_CONFIDENCE: f64 = 0.6;

/// Correlations stronger than this become insights of their own
const CORRELATION_INSIGHT_THRESHOLD: f64 = 0.5;
/// History depth that upgrades a performance summary to high priority
const ESTABLISHED_HISTORY: usize = 3;
/// Maximum chart suggestions per report
const MAX_CHARTS: usize = 6;

/// Concrete follow-up per flagged body part or skill
const DRILLS: &[(&str, &str)] = &[
    ("foot", "footwork drills"),
    ("feet", "footwork drills"),
    ("footwork", "footwork drills"),
    ("leg", "strength and conditioning work"),
    ("knee", "stability work"),
    ("ankle", "balance and mobility work"),
    ("arm", "resistance training"),
    ("shoulder", "mobility work"),
    ("back", "core strengthening"),
    ("hamstring", "a stretching routine"),
    ("calf", "calf raises and mobility work"),
    ("hip", "hip mobility work"),
    ("shooting", "shooting practice"),
    ("passing", "passing drills"),
    ("dribbling", "ball-control drills"),
    ("defending", "positioning work"),
    ("heading", "heading practice"),
    ("accuracy", "target practice"),
    ("endurance", "interval training"),
];

fn drill_for(area: &str) -> String {
    DRILLS
        .iter()
        .find(|(part, _)| *part == area)
        .map(|(_, drill)| (*drill).to_string())
        .unwrap_or_else(|| format!("targeted {} exercises", area))
}

/// Builds insights from the analysis stages' outputs
pub struct InsightBuilder;

impl InsightBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Generate all insight kinds in a fixed order: performance, trend,
    /// improvement, sentiment, correlation. The ranker reorders by score;
    /// this order is what stable ties fall back to.
    pub fn build(
        &self,
        datasets: &[AnalyzedDataset],
        aggregations: &[MetricAggregation],
        correlations: &[CorrelationResult],
    ) -> Vec<Insight> {
        let mut insights = Vec::new();
        insights.extend(self.performance_insights(aggregations));
        insights.extend(self.trend_insights(aggregations));
        insights.extend(self.improvement_insights(datasets));
        insights.extend(self.sentiment_insights(datasets));
        insights.extend(self.correlation_insights(correlations));
        tracing::debug!(count = insights.len(), "generated insights");
        insights
    }

    /// One headline summary per domain present in the aggregations, using
    /// the domain's signature metric when it exists and the busiest metric
    /// otherwise.
    fn performance_insights(&self, aggregations: &[MetricAggregation]) -> Vec<Insight> {
        let mut insights = Vec::new();
        let domains: BTreeSet<Domain> = aggregations.iter().map(|a| a.domain).collect();

        for domain in domains {
            let headline = headline_metric(domain)
                .and_then(|metric| {
                    aggregations
                        .iter()
                        .find(|a| a.domain == domain && a.metric == metric)
                })
                .or_else(|| {
                    aggregations
                        .iter()
                        .filter(|a| a.domain == domain)
                        .max_by_key(|a| a.count)
                });
            let Some(agg) = headline else {
                continue;
            };

            let priority = if agg.history.len() >= ESTABLISHED_HISTORY {
                Priority::High
            } else {
                Priority::Medium
            };
            insights.push(
                Insight::new(
                    InsightKind::Performance,
                    format!("{} summary", capitalize(&domain.to_string())),
                    performance_summary(agg),
                    priority,
                    PERFORMANCE_CONFIDENCE,
                )
                .with_related_metrics(vec![agg.key()]),
            );
        }
        insights
    }

    fn trend_insights(&self, aggregations: &[MetricAggregation]) -> Vec<Insight> {
        aggregations
            .iter()
            .filter(|agg| agg.trend != Trend::Stable)
            .map(|agg| {
                let direction = match agg.trend {
                    Trend::Increasing => "up",
                    _ => "down",
                };
                Insight::new(
                    InsightKind::Trend,
                    format!("Trend: {}", agg.metric),
                    format!("{} is trending {}", agg.metric, direction),
                    Priority::Medium,
                    TREND_CONFIDENCE,
                )
                .with_recommendation(trend_recommendation(agg.domain, agg.trend))
                .with_related_metrics(vec![agg.key()])
            })
            .collect()
    }

    /// High-priority insights for body parts or skills flagged alongside an
    /// improvement-area category in the same entry.
    fn improvement_insights(&self, datasets: &[AnalyzedDataset]) -> Vec<Insight> {
        let mut areas: BTreeSet<String> = BTreeSet::new();
        for dataset in datasets {
            for extraction in &dataset.extractions {
                let unit = &extraction.unit;
                if !unit.categories.contains_key("improvement_areas") {
                    continue;
                }
                for entity_set in ["body_parts", "skills"] {
                    if let Some(entities) = unit.entities.get(entity_set) {
                        areas.extend(entities.iter().cloned());
                    }
                }
            }
        }

        areas
            .into_iter()
            .map(|area| {
                let drill = drill_for(&area);
                Insight::new(
                    InsightKind::Improvement,
                    format!("Improvement focus: {}", area),
                    format!("Your entries flag {} as needing work", area),
                    Priority::High,
                    IMPROVEMENT_CONFIDENCE,
                )
                .with_recommendation(format!("Add {} to your weekly routine", drill))
            })
            .collect()
    }

    /// Low-priority mood note per dataset whose non-neutral entries lean
    /// strictly one way.
    fn sentiment_insights(&self, datasets: &[AnalyzedDataset]) -> Vec<Insight> {
        let mut insights = Vec::new();
        for dataset in datasets {
            let mut positive = 0usize;
            let mut negative = 0usize;
            for extraction in &dataset.extractions {
                match extraction.unit.sentiment {
                    Sentiment::Positive => positive += 1,
                    Sentiment::Negative => negative += 1,
                    Sentiment::Neutral => {}
                }
            }
            if positive == negative {
                continue;
            }

            let leaning = if positive > negative {
                "positive"
            } else {
                "negative"
            };
            let mut insight = Insight::new(
                InsightKind::Sentiment,
                format!("Mood check: {}", dataset.dataset.name),
                format!("Most entries in {} read {}", dataset.dataset.name, leaning),
                Priority::Low,
                SENTIMENT_CONFIDENCE,
            );
            if negative > positive {
                insight = insight.with_recommendation("Note one thing that went well each day");
            }
            insights.push(insight);
        }
        insights
    }

    fn correlation_insights(&self, correlations: &[CorrelationResult]) -> Vec<Insight> {
        correlations
            .iter()
            .filter(|corr| corr.coefficient.abs() > CORRELATION_INSIGHT_THRESHOLD)
            .map(|corr| {
                Insight::new(
                    InsightKind::Correlation,
                    format!("Link: {} and {}", corr.entity_a, corr.entity_b),
                    corr.description.clone(),
                    Priority::Medium,
                    corr.coefficient.abs().min(1.0),
                )
                .with_related_metrics(vec![corr.entity_a.clone(), corr.entity_b.clone()])
            })
            .collect()
    }

    /// Chart suggestions for the report consumer: line charts for metrics
    /// with established history, one bar chart per domain, a pie of the
    /// domain mix when there is one. Capped at 6 in that order.
    pub fn suggest_charts(
        &self,
        aggregations: &[MetricAggregation],
        domains: &BTreeSet<Domain>,
    ) -> Vec<ChartSuggestion> {
        let mut charts = Vec::new();

        for agg in aggregations {
            if agg.history.len() < ESTABLISHED_HISTORY {
                continue;
            }
            charts.push(ChartSuggestion {
                kind: ChartKind::Line,
                title: format!("{} over time", agg.metric),
                metric: Some(agg.key()),
                domain: Some(agg.domain),
                reason: format!("{} logged values", agg.history.len()),
            });
        }

        for domain in domains {
            if !aggregations.iter().any(|a| a.domain == *domain) {
                continue;
            }
            charts.push(ChartSuggestion {
                kind: ChartKind::Bar,
                title: format!("Top {} metrics", domain),
                metric: None,
                domain: Some(*domain),
                reason: format!("compare {} metrics side by side", domain),
            });
        }

        if domains.len() > 1 {
            charts.push(ChartSuggestion {
                kind: ChartKind::Pie,
                title: "Datasets by domain".to_string(),
                metric: None,
                domain: None,
                reason: "more than one domain present".to_string(),
            });
        }

        charts.truncate(MAX_CHARTS);
        charts
    }
}

impl Default for InsightBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The metric that headlines a domain's performance summary
fn headline_metric(domain: Domain) -> Option<&'static str> {
    match domain {
        Domain::Sports => Some("goals"),
        Domain::Health => Some("steps"),
        Domain::Financial => Some("amount"),
        Domain::Productivity => Some("tasks"),
        _ => None,
    }
}

fn performance_summary(agg: &MetricAggregation) -> String {
    let sessions = if agg.count == 1 { "session" } else { "sessions" };
    match (agg.domain, agg.metric.as_str()) {
        (Domain::Sports, "goals") => format!(
            "Scored {} goals across {} {}",
            format_number(agg.total),
            agg.count,
            sessions
        ),
        (Domain::Health, "steps") => format!(
            "Averaging {} steps per entry",
            format_number(agg.average)
        ),
        (Domain::Financial, "amount") => format!(
            "Recorded ${:.2} across {} entries",
            agg.total, agg.count
        ),
        (Domain::Productivity, "tasks") => format!(
            "Completed {} tasks across {} entries",
            format_number(agg.total),
            agg.count
        ),
        _ => format!(
            "Tracked {}: {} entries averaging {}",
            agg.metric,
            agg.count,
            format_number(agg.average)
        ),
    }
}

fn trend_recommendation(domain: Domain, trend: Trend) -> &'static str {
    let rising = trend == Trend::Increasing;
    match domain {
        Domain::Sports => {
            if rising {
                "Keep up the current training intensity"
            } else {
                "Consider adjusting your training plan"
            }
        }
        Domain::Health => {
            if rising {
                "Your habits are paying off, keep going"
            } else {
                "Small daily changes can turn this around"
            }
        }
        Domain::Financial => {
            if rising {
                "Review recent purchases to keep spending deliberate"
            } else {
                "Spending is coming down, lock in the habit"
            }
        }
        Domain::Productivity => {
            if rising {
                "Momentum is building, protect your focus time"
            } else {
                "Try timeboxing to get back on track"
            }
        }
        _ => {
            if rising {
                "Keep doing what you're doing"
            } else {
                "Worth a closer look this week"
            }
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
