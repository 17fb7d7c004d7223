//! Pluggable text-model backend abstraction
//!
//! The Unit Extractor can hand free text to an external text-generation
//! model for richer extraction. Everything behind that option lives here:
//!
//! - `TextModelBackend` trait: the interface a backend implements
//! - `TextModelClient` enum: concrete wrapper providing Clone and
//!   compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `MockBackend`
//!
//! The backend is always optional. Extraction never depends on one being
//! reachable; the caller probes `health_check` and falls back to the
//! rule-based path when the probe or the call fails.
//!
//! # Configuration
//!
//! Environment variables:
//! - `WEAVE_MODEL_BACKEND`: backend to use (ollama, mock, none). Default: ollama
//! - `WEAVE_MODEL_HOST`: model server URL (required for ollama)
//! - `WEAVE_MODEL_NAME`: model name (default: gemma3)

mod mock;
mod ollama;
pub mod parsing;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;

use async_trait::async_trait;

use crate::config::ModelConfig;
use crate::error::Result;
use crate::models::ExtractedUnit;

/// Interface implemented by every text-model backend
#[async_trait]
pub trait TextModelBackend: Send + Sync {
    /// Extract metrics, categories, entities, and sentiment from one entry
    async fn extract_units(&self, text: &str) -> Result<ExtractedUnit>;

    /// Whether the backend is reachable
    async fn health_check(&self) -> bool;

    /// Model name, for logging
    fn model(&self) -> &str;

    /// Host URL, for logging
    fn host(&self) -> &str;
}

/// Concrete client enum, cloneable with compile-time dispatch
#[derive(Clone)]
pub enum TextModelClient {
    Ollama(OllamaBackend),
    Mock(MockBackend),
}

impl TextModelClient {
    /// Create a client from environment variables.
    ///
    /// `WEAVE_MODEL_BACKEND` picks the backend; `none` disables the model
    /// path entirely. Returns None when required variables are missing.
    pub fn from_env() -> Option<Self> {
        let backend =
            std::env::var("WEAVE_MODEL_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(TextModelClient::Ollama),
            "mock" => Some(TextModelClient::Mock(MockBackend::new())),
            "none" | "off" => None,
            _ => {
                tracing::warn!(backend = %backend, "unknown WEAVE_MODEL_BACKEND, trying ollama");
                OllamaBackend::from_env().map(TextModelClient::Ollama)
            }
        }
    }

    /// Create a client from resolved configuration
    pub fn from_config(config: &ModelConfig) -> Option<Self> {
        match config.backend.to_lowercase().as_str() {
            "ollama" => Some(TextModelClient::Ollama(OllamaBackend::new(
                &config.host,
                &config.name,
            ))),
            "mock" => Some(TextModelClient::Mock(MockBackend::new())),
            "none" => None,
            other => {
                tracing::warn!(backend = %other, "unknown model backend in config, model path disabled");
                None
            }
        }
    }

    pub fn ollama(host: &str, model: &str) -> Self {
        TextModelClient::Ollama(OllamaBackend::new(host, model))
    }

    pub fn mock() -> Self {
        TextModelClient::Mock(MockBackend::new())
    }

    /// Mock whose health probe fails, for exercising fallback paths
    pub fn mock_unhealthy() -> Self {
        TextModelClient::Mock(MockBackend::unhealthy())
    }

    pub fn with_model(&self, model: &str) -> Self {
        match self {
            TextModelClient::Ollama(b) => TextModelClient::Ollama(b.with_model(model)),
            TextModelClient::Mock(b) => TextModelClient::Mock(b.with_model(model)),
        }
    }
}

#[async_trait]
impl TextModelBackend for TextModelClient {
    async fn extract_units(&self, text: &str) -> Result<ExtractedUnit> {
        match self {
            TextModelClient::Ollama(b) => b.extract_units(text).await,
            TextModelClient::Mock(b) => b.extract_units(text).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            TextModelClient::Ollama(b) => b.health_check().await,
            TextModelClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            TextModelClient::Ollama(b) => b.model(),
            TextModelClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            TextModelClient::Ollama(b) => b.host(),
            TextModelClient::Mock(b) => b.host(),
        }
    }
}
