//! Weave Core Library
//!
//! Shared functionality for the weave personal records tool:
//! - CSV and free-text dataset import
//! - Rule-based unit extraction from journal text
//! - Domain classification from column names and value shapes
//! - Per-run metric aggregation with trend tracking
//! - Cross-dataset and cross-metric correlation
//! - Insight generation, ranking, and recommendations
//! - Pluggable local text-model backends (Ollama, mock)

pub mod ai;
pub mod aggregate;
pub mod classify;
pub mod config;
pub mod correlate;
pub mod dates;
pub mod error;
pub mod extract;
pub mod import;
pub mod insights;
pub mod models;
pub mod pipeline;
pub mod store;

/// Test utilities including mock model server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{MockBackend, OllamaBackend, TextModelBackend, TextModelClient};
pub use aggregate::MetricRegistry;
pub use classify::DomainClassifier;
pub use config::{ModelConfig, WeaveConfig};
pub use correlate::CorrelationEngine;
pub use error::{Error, Result};
pub use extract::UnitExtractor;
pub use insights::InsightBuilder;
pub use pipeline::AnalysisPipeline;
pub use store::{DatasetStore, MemoryStore};
