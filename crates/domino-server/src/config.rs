//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files: bind address, model endpoint, and the
//! engine tunables. The API key is read from the environment, never from
//! the file.

use domino_engine::EngineConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    pub bind_port: u16,

    /// Whether /analyze responses include a narrative paragraph
    #[serde(default = "default_narrative_enabled")]
    pub narrative_enabled: bool,

    /// Model endpoint settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Expansion engine tunables
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Model endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// OpenAI-compatible API base URL
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: domino_llm::openai::DEFAULT_BASE_URL.to_string(),
            model: domino_llm::openai::DEFAULT_MODEL.to_string(),
            temperature: domino_llm::openai::DEFAULT_TEMPERATURE,
            request_timeout_secs: domino_llm::openai::DEFAULT_TIMEOUT_SECS,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

fn default_narrative_enabled() -> bool {
    true
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        config.engine.validate().map_err(ConfigError::Invalid)?;
        if config.model.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "model.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(config)
    }

    /// Create a default configuration for local development
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8000,
            narrative_enabled: true,
            model: ModelConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
