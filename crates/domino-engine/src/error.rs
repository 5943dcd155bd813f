//! Error types for the expansion engine

use thiserror::Error;

/// Errors that fail a whole expansion
#[derive(Error, Debug)]
pub enum ExpansionError {
    /// Root event was empty or whitespace
    #[error("event is empty")]
    EmptyEvent,

    /// Root event exceeds the configured length limit
    #[error("event too long: {0} chars (max: {1})")]
    EventTooLong(usize, usize),

    /// A requested fanout was zero
    #[error("fanout must be at least 1")]
    InvalidFanout,

    /// The root analysis call failed after all retries
    #[error("language model unavailable: {0}")]
    Upstream(String),

    /// The root analysis succeeded but produced zero usable impacts
    #[error("no usable direct impacts for this event")]
    NoDirectImpacts,
}

impl ExpansionError {
    /// True for failures the caller should retry later rather than
    /// rephrase the input for.
    pub fn is_transient(&self) -> bool {
        matches!(self, ExpansionError::Upstream(_))
    }
}

/// A model response that could not be turned into impact candidates at all.
///
/// Per-candidate problems are not errors; they drop the candidate and
/// increment the batch's dropped counter instead.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The response body was not valid JSON
    #[error("response is not valid JSON: {0}")]
    Json(String),

    /// The JSON carried no recognizable impact array
    #[error("no impact array in response")]
    MissingImpacts,
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        ParseError::Json(e.to_string())
    }
}
