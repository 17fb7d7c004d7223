//! Mock backend for testing
//!
//! Deterministic extractions without a running model server. The healthy
//! mock delegates to the rule-based extractor, so it behaves like a model
//! that happens to agree with the local path; the unhealthy mock fails its
//! probe and its calls, for exercising fallbacks.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::extract::UnitExtractor;
use crate::models::ExtractedUnit;

use super::TextModelBackend;

#[derive(Clone)]
pub struct MockBackend {
    /// Whether `health_check` reports reachable
    pub healthy: bool,
}

impl MockBackend {
    /// A healthy mock
    pub fn new() -> Self {
        Self { healthy: true }
    }

    /// A mock whose probe and calls fail
    pub fn unhealthy() -> Self {
        Self { healthy: false }
    }

    /// Create a new instance with a different model (no-op for mock)
    pub fn with_model(&self, _model: &str) -> Self {
        self.clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextModelBackend for MockBackend {
    async fn extract_units(&self, text: &str) -> Result<ExtractedUnit> {
        if !self.healthy {
            return Err(Error::Model("mock backend is unhealthy".into()));
        }
        Ok(UnitExtractor::new().extract(text))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
