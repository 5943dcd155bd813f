//! Sentiment polarity and node role value types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Polarity of a causal edge: does the cause push the effect up or down?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Bullish / beneficial impact
    Positive,
    /// Bearish / detrimental impact
    Negative,
}

impl Sentiment {
    /// Map a raw model token to a sentiment.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Anything other than `positive`/`negative` (neutral, mixed, garbage)
    /// returns `None` — callers decide whether a fallback applies.
    ///
    /// # Examples
    ///
    /// ```
    /// use domino_domain::Sentiment;
    ///
    /// assert_eq!(Sentiment::parse(" Positive "), Some(Sentiment::Positive));
    /// assert_eq!(Sentiment::parse("neutral"), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }

    /// Canonical lowercase token
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a node in the expansion: the root event, a first-order
/// impact, or a second-order impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// The layer-0 event the expansion started from
    Root,
    /// A layer-1 first-order effect
    Direct,
    /// A layer-2 second-order effect
    Downstream,
}

impl NodeRole {
    /// Canonical lowercase token
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Root => "root",
            NodeRole::Direct => "direct",
            NodeRole::Downstream => "downstream",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
