use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::context::DEFAULT_CONTEXT_CHARS;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// `"gemini"` or `"disabled"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model name; defaults to the provider's standard model when unset.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            timeout_secs: 30,
        }
    }
}

impl ModelConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContextConfig {
    /// Character budget for the assembled context.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_CONTEXT_CHARS,
        }
    }
}

fn default_max_chars() -> usize {
    DEFAULT_CONTEXT_CHARS
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7411".to_string()
}

impl Config {
    /// All-defaults config for config-less CLI runs and tests.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.context.max_chars == 0 {
        anyhow::bail!("context.max_chars must be > 0");
    }

    match config.model.provider.as_str() {
        "disabled" | "gemini" => {}
        other => anyhow::bail!(
            "Unknown model provider: '{}'. Must be disabled or gemini.",
            other
        ),
    }

    if config.model.timeout_secs == 0 {
        anyhow::bail!("model.timeout_secs must be > 0");
    }

    Ok(config)
}
