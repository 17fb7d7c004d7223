//! Test utilities for weave-core
//!
//! This module provides testing infrastructure including a mock text-model
//! server (Ollama wire shape) that can be used for development and
//! integration tests.

use axum::{
    extract::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock text-model server for testing and development
pub struct MockModelServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockModelServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockModelServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "gemma3:latest".to_string(),
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            size: 3_000_000_000,
        }],
    })
}

/// Ollama generate endpoint: canned extraction replies keyed off the entry
async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<GenerateResponse> {
    let entry = extract_entry_from_prompt(&request.prompt).to_lowercase();

    let response = if entry.contains("goal") {
        // Prose around the object exercises the JSON-span scan
        concat!(
            "Here is the extraction:\n",
            r#"{"metrics": {"goals": 2, "assists": 2, "miles": 7}, "#,
            r#""categories": {"sports_performance": ["goal", "assist"]}, "#,
            r#""entities": {"body_parts": ["foot"]}, "sentiment": "positive", "#,
            r#""confidence": 0.9}"#,
            "\nLet me know if you need anything else."
        )
        .to_string()
    } else if entry.contains("steps") {
        r#"{"metrics": {"steps": 12000}, "categories": {"health_metrics": ["steps"]}, "entities": {}, "sentiment": "neutral", "confidence": 0.85}"#.to_string()
    } else if entry.contains("spent") || entry.contains('$') {
        r#"{"metrics": {"amount": 45.5}, "categories": {}, "entities": {}, "sentiment": "neutral", "confidence": 0.8}"#.to_string()
    } else {
        r#"{"metrics": {}, "categories": {}, "entities": {}, "sentiment": "neutral"}"#.to_string()
    };

    Json(GenerateResponse {
        model: request.model,
        response,
        done: true,
    })
}

/// Pull the journal entry back out of the extraction prompt
fn extract_entry_from_prompt(prompt: &str) -> String {
    if let Some(start) = prompt.find("Entry: \"") {
        let after_start = &prompt[start + 8..];
        if let Some(end) = after_start.find('"') {
            return after_start[..end].to_string();
        }
    }
    prompt.to_string()
}

// Request/Response types for the mock server

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[allow(dead_code)]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}
