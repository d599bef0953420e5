//! Pipeline configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! environment variables (after `.env` is loaded by the binary), then CLI
//! flags applied by the caller.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_MODEL: &str = "CRISPR_MODEL";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing OPENAI_API_KEY; set it in the environment or a .env file, or run with --offline")]
    MissingApiKey,

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for the chat-completions endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub base_url: String,
    /// Never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    /// No timeout when unset
    pub request_timeout_secs: Option<u64>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Limits for the task graph executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Hard cap on scheduling iterations per run
    pub max_iterations: usize,
    /// Tasks dispatched together in one iteration
    pub max_concurrent_tasks: usize,
    /// Iterations during which a stalled graph may be forced forward
    pub force_progression_window: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            max_concurrent_tasks: 3,
            force_progression_window: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub completion: CompletionConfig,
    pub executor: ExecutorConfig,
}

impl PipelineConfig {
    /// Platform config file location, e.g. `~/.config/crispr-pipeline/config.yaml`
    pub fn default_config_path() -> Option<PathBuf> {
        use directories::ProjectDirs;

        ProjectDirs::from("org", "crispr-pipeline", "crispr-pipeline")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse pipeline configuration YAML")
    }

    /// Load configuration from `path`, or from the default location if present,
    /// then apply environment overrides
    ///
    /// An explicit path must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                Self::from_yaml_str(&content)
                    .with_context(|| format!("Invalid config file: {}", path.display()))?
            }
            None => match Self::default_config_path().filter(|p| p.is_file()) {
                Some(default_path) => {
                    let content = std::fs::read_to_string(&default_path).with_context(|| {
                        format!("Failed to read config file: {}", default_path.display())
                    })?;
                    Self::from_yaml_str(&content)?
                }
                None => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_API_KEY) {
            self.completion.api_key = Some(key);
        }
        if let Some(url) = non_empty(ENV_BASE_URL) {
            self.completion.base_url = url;
        }
        if let Some(model) = non_empty(ENV_MODEL) {
            self.completion.model = model;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.executor.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "executor.max_iterations must be at least 1".to_string(),
            ));
        }
        if self.executor.max_concurrent_tasks == 0 {
            return Err(ConfigError::Invalid(
                "executor.max_concurrent_tasks must be at least 1".to_string(),
            ));
        }
        if self.completion.model.trim().is_empty() {
            return Err(ConfigError::Invalid("completion.model is empty".to_string()));
        }
        Ok(())
    }

    /// API key, required unless running offline
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.completion
            .api_key
            .as_deref()
            .ok_or(ConfigError::MissingApiKey)
    }
}
