//! Domino Domain Layer
//!
//! Core data model for causal graphs: sentiment-labeled directed edges
//! between event nodes arranged in layers. This crate holds only value
//! types and the graph container; orchestration and I/O live in other
//! crates.
//!
//! ## Key Concepts
//!
//! - **Node**: an event or affected entity, identified by a stable hash of
//!   its normalized label, placed at layer 0 (root), 1 (direct impact) or
//!   2 (downstream impact)
//! - **Edge**: a directed cause → effect link carrying a sentiment
//!   (positive/negative) and a short rationale
//! - **CausalGraph**: an arena of nodes addressed by index, deduplicated by
//!   normalized label, with a creation-ordered edge list
//! - **GraphPayload**: the wire shape consumed by the visualization client

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod graph;
pub mod sentiment;
pub mod wire;

// Re-exports for convenience
pub use graph::{display_label, node_id, normalize_label, CausalGraph, Edge, Node, ROOT};
pub use sentiment::{NodeRole, Sentiment};
pub use wire::{GraphPayload, WireEdge, WireNode};
