//! Ollama backend implementation
//!
//! HTTP client for a local Ollama server's generate API. One prompt shape,
//! plain JSON replies parsed by `super::parsing`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::ExtractedUnit;

use super::parsing::parse_extraction;
use super::TextModelBackend;

/// Prompt template; `{text}` is replaced with the journal entry
const EXTRACTION_PROMPT: &str = r#"Extract structured data from this journal entry.

Entry: "{text}"

Reply with only a JSON object shaped like:
{"metrics": {"goals": 2}, "categories": {"sports_performance": ["goal"]}, "entities": {"body_parts": ["foot"]}, "sentiment": "positive"}

Use lowercase canonical metric names (goals, assists, miles, kilometers,
minutes, hours, steps, calories). Sentiment is one of positive, negative,
neutral."#;

/// Backend speaking Ollama's `/api/generate` endpoint
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
        }
    }

    /// Create from `WEAVE_MODEL_HOST` / `WEAVE_MODEL_NAME`
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("WEAVE_MODEL_HOST").ok()?;
        let model = std::env::var("WEAVE_MODEL_NAME").unwrap_or_else(|_| "gemma3".to_string());
        Some(Self::new(&host, &model))
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl TextModelBackend for OllamaBackend {
    async fn extract_units(&self, text: &str) -> Result<ExtractedUnit> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: EXTRACTION_PROMPT.replace("{text}", text),
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Http(response.error_for_status().unwrap_err()));
        }

        let generated: GenerateResponse = response.json().await?;
        debug!(reply = %generated.response, "model extraction reply");

        parse_extraction(&generated.response)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
