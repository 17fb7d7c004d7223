//! Runtime configuration
//!
//! Two-layer resolution in this order: defaults embedded at compile time,
//! a user override file at `<data_local_dir>/weave/config.toml` when one
//! exists, then `WEAVE_MODEL_*` environment variables on top. Only the
//! text-model backend is configurable; analysis behavior is fixed.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/weave.toml");

/// Resolved text-model settings
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Backend kind: `ollama`, `mock`, or `none`
    pub backend: String,
    pub host: String,
    pub name: String,
    /// Bound on the health probe and each generation call
    pub timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: "none".to_string(),
            host: "http://localhost:11434".to_string(),
            name: "gemma3".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WeaveConfig {
    pub model: ModelConfig,
}

impl WeaveConfig {
    /// Load with full resolution: embedded defaults, user file, env vars.
    pub fn load() -> Result<Self> {
        let content = match default_config_path() {
            Some(path) if path.exists() => fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("failed to read {}: {}", path.display(), e))
            })?,
            _ => DEFAULT_CONFIG.to_string(),
        };
        let mut config = parse_config(&content)?;
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(backend) = std::env::var("WEAVE_MODEL_BACKEND") {
            self.model.backend = backend;
        }
        if let Ok(host) = std::env::var("WEAVE_MODEL_HOST") {
            self.model.host = host;
        }
        if let Ok(name) = std::env::var("WEAVE_MODEL_NAME") {
            self.model.name = name;
        }
        if let Ok(secs) = std::env::var("WEAVE_MODEL_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) => self.model.timeout = Duration::from_secs(secs),
                Err(_) => {
                    tracing::warn!(value = %secs, "ignoring invalid WEAVE_MODEL_TIMEOUT_SECS")
                }
            }
        }
    }
}

/// User override location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("weave").join("config.toml"))
}

/// Raw structure for TOML parsing; every field optional
#[derive(Debug, Deserialize)]
struct RawConfig {
    model: Option<RawModel>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    backend: Option<String>,
    host: Option<String>,
    name: Option<String>,
    timeout_secs: Option<u64>,
}

fn parse_config(content: &str) -> Result<WeaveConfig> {
    let raw: RawConfig =
        toml::from_str(content).map_err(|e| Error::Config(format!("invalid config: {}", e)))?;

    let defaults = ModelConfig::default();
    let model = match raw.model {
        Some(raw) => ModelConfig {
            backend: raw.backend.unwrap_or(defaults.backend),
            host: raw.host.unwrap_or(defaults.host),
            name: raw.name.unwrap_or(defaults.name),
            timeout: raw
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        },
        None => defaults,
    };

    Ok(WeaveConfig { model })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_empty_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.model.backend, "none");
        assert_eq!(config.model.name, "gemma3");
        assert_eq!(config.model.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_parse_config_reads_model_section() {
        let config = parse_config(
            r#"
[model]
backend = "ollama"
host = "http://box:11434"
name = "llama3.2"
timeout_secs = 10
"#,
        )
        .unwrap();
        assert_eq!(config.model.backend, "ollama");
        assert_eq!(config.model.host, "http://box:11434");
        assert_eq!(config.model.name, "llama3.2");
        assert_eq!(config.model.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_embedded_default_config_parses() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.model.backend, "none");
    }

    #[test]
    fn test_parse_config_rejects_bad_toml() {
        assert!(matches!(
            parse_config("model = nonsense"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_default_config_path_under_weave_dir() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("weave/config.toml"));
        }
    }
}
