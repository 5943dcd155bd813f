//! Domino Expansion Engine
//!
//! Turns one macroeconomic headline into a bounded causal graph by
//! orchestrating language-model calls: root event → direct impacts →
//! downstream impacts, two layers deep, fixed fanout per layer.
//!
//! The pipeline is prompt → completion → parse → merge. Single bad
//! candidates and single failed branches are absorbed and logged; only
//! failures that invalidate the whole graph (empty input, the root call
//! failing, the root call yielding nothing usable) propagate.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod expander;
pub mod narrative;
pub mod parser;
pub mod prompt;

pub use config::EngineConfig;
pub use error::{ExpansionError, ParseError};
pub use expander::CausalExpander;
pub use narrative::NarrativeSummarizer;
pub use parser::{parse_impacts, ImpactBatch, ImpactCandidate, ParseOptions};
