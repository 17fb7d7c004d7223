//! Insight generation and ranking
//!
//! Turns the analysis stages' outputs into prioritized, human-readable
//! insights. Instead of handing consumers raw aggregations, this layer
//! surfaces what's interesting or actionable: performance summaries,
//! trends, improvement areas pulled from journal entries, mood notes, and
//! cross-dataset links.
//!
//! ## Flow
//!
//! ```rust,ignore
//! use weave_core::insights::{InsightBuilder, build_recommendations, rank};
//!
//! let insights = InsightBuilder::new().build(&datasets, &aggregations, &correlations);
//! let ranked = rank(insights);
//! let recommendations = build_recommendations(&ranked, &correlations, &domains);
//! ```

pub mod builder;
pub mod ranker;

pub use builder::InsightBuilder;
pub use ranker::{build_recommendations, rank};
