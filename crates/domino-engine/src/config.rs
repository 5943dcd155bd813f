//! Configuration for the expansion engine

use crate::parser::ParseOptions;
use domino_domain::Sentiment;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for one expansion engine instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default number of direct impacts requested for the root event
    pub direct_count: usize,

    /// Default number of downstream impacts requested per direct impact
    pub downstream_count: usize,

    /// Hard cap applied to caller-supplied fanouts
    pub max_fanout: usize,

    /// Maximum root event length (characters)
    pub max_event_len: usize,

    /// Maximum target label length; longer labels are truncated
    pub max_target_len: usize,

    /// Retries per analysis call after the first attempt
    pub max_retries: u32,

    /// Base backoff delay in milliseconds, doubled per retry
    pub backoff_base_ms: u64,

    /// Per-call timeout in seconds
    pub request_timeout_secs: u64,

    /// Sentiment assigned to candidates with an unrecognized sentiment
    /// token. `None` drops such candidates.
    pub default_sentiment: Option<Sentiment>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            direct_count: 3,
            downstream_count: 2,
            max_fanout: 6,
            max_event_len: 500,
            max_target_len: 200,
            max_retries: 2,
            backoff_base_ms: 1000,
            request_timeout_secs: 30,
            default_sentiment: None,
        }
    }
}

impl EngineConfig {
    /// Per-call timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Backoff delay for a given retry attempt (0-based): base, 2×base, ...
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_base_ms << attempt.min(8))
    }

    /// Parser settings derived from this config
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_target_len: self.max_target_len,
            default_sentiment: self.default_sentiment,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.direct_count == 0 {
            return Err("direct_count must be greater than 0".to_string());
        }
        if self.downstream_count == 0 {
            return Err("downstream_count must be greater than 0".to_string());
        }
        if self.max_fanout == 0 {
            return Err("max_fanout must be greater than 0".to_string());
        }
        if self.max_event_len == 0 {
            return Err("max_event_len must be greater than 0".to_string());
        }
        if self.max_target_len == 0 {
            return Err("max_target_len must be greater than 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Preset for unit tests: no retries, no backoff, tight timeout.
    pub fn fast_test() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
            request_timeout_secs: 5,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("failed to parse TOML: {}", e))
    }
}
