//! Configuration loading and management for ssai.
//!
//! Loads settings from `ssai.toml` with an environment variable override for the API key.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the credential, both as a config key and as an environment variable.
pub const API_KEY_NAME: &str = "OPENAI_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("failed to write config: {0}")]
    WriteError(#[from] toml::ser::Error),
    #[error("OPENAI_KEY is not set")]
    MissingApiKey,
    #[error("could not determine the user configuration directory")]
    NoConfigDir,
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Chat model identifier (e.g., "gpt-4o-mini")
    pub model: String,
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

/// Transcript preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    /// Caption languages to try, in order of preference
    pub languages: Vec<String>,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "OPENAI_KEY", default, skip_serializing_if = "Option::is_none")]
    pub openai_key: Option<String>,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub youtube: YoutubeConfig,
}

impl Config {
    /// Default location: `<config dir>/ssai/ssai.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("ssai").join("ssai.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load configuration from a path, letting the environment override the stored key.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        Ok(config.with_key_override(std::env::var(API_KEY_NAME).ok()))
    }

    /// Read the file only. A missing file yields the defaults.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Replace the stored key with `key` when it is present and non-blank.
    pub fn with_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.openai_key = Some(key);
        }
        self
    }

    /// Get the API key, treating a blank value as missing
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.openai_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Persist the API key into the file at `path`, keeping every other setting in it.
    pub fn store_api_key(path: &Path, key: &str) -> Result<(), ConfigError> {
        if key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let mut table = if path.exists() {
            toml::from_str::<toml::Table>(&std::fs::read_to_string(path)?)?
        } else {
            toml::Table::new()
        };
        table.insert(
            API_KEY_NAME.to_string(),
            toml::Value::String(key.trim().to_string()),
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string(&table)?)?;
        tracing::debug!("stored {} in {}", API_KEY_NAME, path.display());
        Ok(())
    }
}
