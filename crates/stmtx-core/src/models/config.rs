//! Configuration structures for statement extraction.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the remote service credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the remote model name.
pub const MODEL_ENV: &str = "OPENAI_MODEL";

/// Main configuration for the stmtx pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementConfig {
    /// Remote extraction service configuration.
    pub remote: RemoteConfig,

    /// Heuristic table strategy configuration.
    pub heuristic: HeuristicConfig,
}

/// Remote extraction service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Service credential. Usually left empty in the file and taken from the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model identifier sent with every request.
    pub model: String,

    /// Base URL of the chat completion API.
    pub base_url: String,

    /// Maximum number of document characters sent to the service.
    pub max_input_chars: usize,

    /// Sampling temperature.
    pub temperature: f32,

    /// Whole-request timeout in seconds (none = wait indefinitely).
    pub timeout_secs: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-3.5-turbo-1106".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            max_input_chars: 20_000,
            temperature: 0.0,
            timeout_secs: None,
        }
    }
}

impl RemoteConfig {
    /// Model name as sent to the service.
    ///
    /// `4.1` family names are not accepted by the JSON-mode endpoint and are
    /// replaced with `gpt-4o-mini`.
    pub fn effective_model(&self) -> String {
        if self.model.contains("4.1") {
            "gpt-4o-mini".to_string()
        } else {
            self.model.clone()
        }
    }
}

/// Heuristic table strategy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Description used when a table has no description column.
    pub placeholder_description: String,

    /// Rewrite recognized dates to `YYYY-MM-DD`; unrecognized dates stay verbatim.
    pub canonicalize_dates: bool,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            placeholder_description: "No Description".to_string(),
            canonicalize_dates: false,
        }
    }
}

impl StatementConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Apply `OPENAI_API_KEY` and `OPENAI_MODEL` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.remote.api_key = Some(key);
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.remote.model = model;
        }
        self
    }

    /// Resolve the service credential: an explicit value wins over configuration.
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| {
                self.remote
                    .api_key
                    .as_deref()
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
            })
    }
}
