//! Insight ranking and recommendation assembly

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{CorrelationResult, Domain, Insight, Priority};

/// Recommendations returned per report
const MAX_RECOMMENDATIONS: usize = 5;
/// Boilerplate recommendations drawn from the present domains
const MAX_BOILERPLATE: usize = 3;
/// Correlations whose description is recommended outright
const RECOMMEND_COEFFICIENT: f64 = 0.5;

/// Canned per-domain suggestions, appended after the earned ones
const DOMAIN_RECOMMENDATIONS: &[(Domain, &[&str])] = &[
    (
        Domain::Financial,
        &[
            "Review subscriptions for anything unused",
            "Set a weekly spending check-in",
        ],
    ),
    (
        Domain::Sports,
        &[
            "Schedule one focused practice session this week",
            "Log results right after each match",
        ],
    ),
    (
        Domain::Health,
        &[
            "Aim for a consistent sleep schedule",
            "Take a short walk on rest days",
        ],
    ),
    (
        Domain::Productivity,
        &[
            "Plan tomorrow's top three tasks tonight",
            "Batch meetings to protect focus blocks",
        ],
    ),
    (Domain::Food, &["Plan meals before the week starts"]),
    (Domain::Home, &["Keep a running list of small fixes"]),
    (
        Domain::General,
        &["Add more entries to sharpen the analysis"],
    ),
];

/// Sort insights by `priority weight × confidence`, highest first.
///
/// The sort is stable: insights scoring the same keep their input order,
/// which downstream output formatting depends on.
pub fn rank(mut insights: Vec<Insight>) -> Vec<Insight> {
    insights.sort_by(|a, b| {
        b.score()
            .partial_cmp(&a.score())
            .unwrap_or(Ordering::Equal)
    });
    insights
}

/// Assemble the report's recommendation list: every high-priority insight's
/// recommendation, then the description of every correlation with a
/// coefficient above 0.5, then up to three domain boilerplate lines.
/// Exact-duplicate strings are dropped keeping the first occurrence, and
/// the result is capped at five.
pub fn build_recommendations(
    insights: &[Insight],
    correlations: &[CorrelationResult],
    domains: &[Domain],
) -> Vec<String> {
    let mut recommendations = Vec::new();

    for insight in insights {
        if insight.priority != Priority::High {
            continue;
        }
        if let Some(recommendation) = &insight.recommendation {
            recommendations.push(recommendation.clone());
        }
    }

    for correlation in correlations {
        if correlation.coefficient > RECOMMEND_COEFFICIENT {
            recommendations.push(correlation.description.clone());
        }
    }

    let mut boilerplate = 0;
    for domain in domains {
        let Some((_, lines)) = DOMAIN_RECOMMENDATIONS.iter().find(|(d, _)| d == domain) else {
            continue;
        };
        for line in *lines {
            if boilerplate == MAX_BOILERPLATE {
                break;
            }
            recommendations.push((*line).to_string());
            boilerplate += 1;
        }
    }

    let mut seen = HashSet::new();
    recommendations.retain(|r| seen.insert(r.clone()));
    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}
