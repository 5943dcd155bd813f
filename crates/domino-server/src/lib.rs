//! Domino Server
//!
//! HTTP boundary for the causal expansion engine: one analysis endpoint
//! plus a health probe, configured from TOML with the model API key taken
//! from the environment.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use domino_engine::{CausalExpander, NarrativeSummarizer};
use domino_llm::{OpenAiClient, OpenAiConfig};
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Required API key environment variable is missing
    #[error("API key environment variable '{0}' is not set")]
    MissingApiKey(String),

    /// Model client construction failed
    #[error("model client error: {0}")]
    Llm(String),

    /// Server binding error
    #[error("failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("server error: {0}")]
    Server(String),
}

/// Start the HTTP server
///
/// Initializes tracing, builds the model client and engine from config,
/// and serves until shutdown.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting Domino server");
    info!("Bind address: {}", config.bind_addr());
    info!("Model: {} at {}", config.model.model, config.model.base_url);
    info!(
        "Fanout: {} direct, {} downstream",
        config.engine.direct_count, config.engine.downstream_count
    );

    let api_key = std::env::var(&config.model.api_key_env)
        .map_err(|_| ServerError::MissingApiKey(config.model.api_key_env.clone()))?;

    let model_config = OpenAiConfig {
        api_key,
        base_url: config.model.base_url.trim_end_matches('/').to_string(),
        model: config.model.model.clone(),
        temperature: config.model.temperature,
        timeout_secs: config.model.request_timeout_secs,
        system_prompt: Some(domino_engine::prompt::ANALYST_PERSONA.to_string()),
    };
    let model = Arc::new(OpenAiClient::new(model_config).map_err(|e| ServerError::Llm(e.to_string()))?);

    let state = AppState {
        expander: Arc::new(CausalExpander::new(
            Arc::clone(&model),
            config.engine.clone(),
        )),
        summarizer: Arc::new(NarrativeSummarizer::new(model, config.engine.clone())),
        narrative_enabled: config.narrative_enabled,
        model_name: config.model.model.clone(),
    };

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_test_config() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_port, 8000);
        assert!(config.engine.validate().is_ok());
    }
}
