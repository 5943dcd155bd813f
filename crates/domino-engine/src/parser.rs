//! Parse raw model output into impact candidates
//!
//! Models are told to return a JSON array, but in practice wrap it in
//! markdown fences or an `{"impacts": [...]}` envelope and misname
//! fields. The parser tolerates all of that; what it will not do is let
//! one malformed candidate spoil its siblings.

use crate::error::ParseError;
use domino_domain::Sentiment;
use serde_json::Value;
use tracing::warn;

/// One validated impact candidate from the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpactCandidate {
    /// Affected entity, trimmed and length-capped
    pub target: String,
    /// Impact polarity
    pub sentiment: Sentiment,
    /// Short explanation of the causal link (may be empty)
    pub rationale: String,
}

/// The candidates recovered from one model response
#[derive(Debug, Clone, Default)]
pub struct ImpactBatch {
    /// Valid candidates, in response order
    pub candidates: Vec<ImpactCandidate>,
    /// Number of malformed candidates dropped from the batch
    pub dropped: usize,
}

/// Per-candidate validation settings
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Targets longer than this are truncated (char-boundary safe)
    pub max_target_len: usize,
    /// Fallback for unrecognized sentiment tokens; `None` drops the candidate
    pub default_sentiment: Option<Sentiment>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_target_len: 200,
            default_sentiment: None,
        }
    }
}

/// Parse a model response into impact candidates.
///
/// Fails only when the response carries no usable impact array at all;
/// individual bad candidates are dropped and counted.
pub fn parse_impacts(response: &str, opts: &ParseOptions) -> Result<ImpactBatch, ParseError> {
    let json_str = strip_fences(response);
    let json: Value = serde_json::from_str(json_str)?;
    let items = impact_array(&json).ok_or(ParseError::MissingImpacts)?;

    let mut batch = ImpactBatch::default();
    for (idx, item) in items.iter().enumerate() {
        match parse_candidate(item, opts) {
            Ok(candidate) => batch.candidates.push(candidate),
            Err(reason) => {
                warn!(idx, %reason, "dropping malformed impact candidate");
                batch.dropped += 1;
            }
        }
    }
    Ok(batch)
}

/// Strip a surrounding markdown code fence, if present.
fn strip_fences(response: &str) -> &str {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let inner = trimmed.trim_start_matches("```");
    // Skip an optional language tag on the fence line
    let inner = match inner.split_once('\n') {
        Some((_, rest)) => rest,
        None => return trimmed,
    };
    inner.trim_end().trim_end_matches("```").trim()
}

/// Locate the candidate array: either the response itself or an
/// `impacts` field on a wrapping object.
fn impact_array(json: &Value) -> Option<&Vec<Value>> {
    match json {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("impacts").and_then(|v| v.as_array()),
        _ => None,
    }
}

fn parse_candidate(json: &Value, opts: &ParseOptions) -> Result<ImpactCandidate, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "candidate is not a JSON object".to_string())?;

    // Field names drift between model runs; accept the common aliases
    let target = obj
        .get("target")
        .or_else(|| obj.get("target_entity"))
        .and_then(|v| v.as_str())
        .map(str::trim)
        .ok_or_else(|| "missing or invalid 'target'".to_string())?;
    if target.is_empty() {
        return Err("empty 'target'".to_string());
    }

    let sentiment_raw = obj
        .get("sentiment")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "missing or invalid 'sentiment'".to_string())?;
    let sentiment = match Sentiment::parse(sentiment_raw) {
        Some(s) => s,
        None => opts
            .default_sentiment
            .ok_or_else(|| format!("unrecognized sentiment '{}'", sentiment_raw))?,
    };

    let rationale = obj
        .get("rationale")
        .or_else(|| obj.get("explanation"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .trim()
        .to_string();

    Ok(ImpactCandidate {
        target: truncate_chars(target, opts.max_target_len),
        sentiment,
        rationale,
    })
}

/// Truncate to at most `max` chars without splitting a char boundary.
fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => s[..byte_idx].trim_end().to_string(),
        None => s.to_string(),
    }
}
