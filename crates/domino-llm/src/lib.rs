//! Domino LLM Provider Layer
//!
//! Pluggable language-model clients behind a single async trait.
//!
//! # Architecture
//!
//! The expansion engine only ever needs one capability: send a prompt,
//! get a text completion back. Everything provider-specific (endpoints,
//! auth, response envelopes) stays inside this crate.
//!
//! # Providers
//!
//! - `ScriptedModel`: deterministic double for tests, no network
//! - `OpenAiClient`: OpenAI-compatible chat-completions API (the hosted
//!   backend used in production)
//!
//! # Examples
//!
//! ```
//! use domino_llm::{LanguageModel, ScriptedModel};
//!
//! # async fn demo() {
//! let model = ScriptedModel::new().with_default("[]");
//! let result = model.complete("any prompt").await.unwrap();
//! assert_eq!(result, "[]");
//! # }
//! ```

#![warn(missing_docs)]

pub mod openai;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

pub use openai::{OpenAiClient, OpenAiConfig};

/// Errors that can occur while talking to a model provider
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("communication error: {0}")]
    Http(String),

    /// Provider rejected the request due to rate limiting
    #[error("rate limit exceeded")]
    RateLimited,

    /// Authentication or authorization failure
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Response arrived but did not contain a usable completion
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request did not complete in time
    #[error("request timed out")]
    Timeout,
}

/// The single capability the engine depends on: text completion.
///
/// Implementations must be safe to share across concurrent expansion
/// branches, which call `complete` in parallel.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send a prompt and return the raw completion text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

enum ScriptEntry {
    Respond(String),
    Fail,
}

/// Deterministic model double for tests.
///
/// Holds an ordered script of `(needle, response)` pairs; the first
/// needle found in the incoming prompt wins. Unmatched prompts fall back
/// to the default response, or fail if none is set. Never sleeps, never
/// touches the network, so graph-construction tests stay deterministic.
///
/// # Examples
///
/// ```
/// use domino_llm::{LanguageModel, ScriptedModel};
///
/// # async fn demo() {
/// let model = ScriptedModel::new()
///     .respond_when("Bond Prices", "[]")
///     .fail_when("Oil Prices")
///     .with_default("{\"impacts\": []}");
///
/// assert!(model.complete("Change in Bond Prices").await.is_ok());
/// assert!(model.complete("Change in Oil Prices").await.is_err());
/// assert_eq!(model.calls(), 2);
/// # }
/// ```
#[derive(Default)]
pub struct ScriptedModel {
    script: Vec<(String, ScriptEntry)>,
    default_response: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    /// Create an empty script; every prompt will fail until entries or a
    /// default are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `response` to any prompt containing `needle`.
    ///
    /// Entries are checked in insertion order, so register specific
    /// needles before generic ones.
    pub fn respond_when(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.script
            .push((needle.into(), ScriptEntry::Respond(response.into())));
        self
    }

    /// Fail with a communication error for any prompt containing `needle`.
    pub fn fail_when(mut self, needle: impl Into<String>) -> Self {
        self.script.push((needle.into(), ScriptEntry::Fail));
        self
    }

    /// Response for prompts no script entry matches.
    pub fn with_default(mut self, response: impl Into<String>) -> Self {
        self.default_response = Some(response.into());
        self
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for (needle, entry) in &self.script {
            if prompt.contains(needle.as_str()) {
                return match entry {
                    ScriptEntry::Respond(response) => Ok(response.clone()),
                    ScriptEntry::Fail => Err(LlmError::Http("scripted failure".to_string())),
                };
            }
        }
        match &self.default_response {
            Some(response) => Ok(response.clone()),
            None => Err(LlmError::Http(format!(
                "no scripted response for prompt ({} chars)",
                prompt.len()
            ))),
        }
    }
}
