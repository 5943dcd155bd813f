//! Wire format for the visualization client
//!
//! Nodes and edges are emitted in creation order so the frontend's
//! incremental-reveal animation follows the logical discovery order.

use crate::graph::CausalGraph;
use crate::sentiment::{NodeRole, Sentiment};
use serde::{Deserialize, Serialize};

/// A node as sent over the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireNode {
    /// Stable content-hash id
    pub id: String,
    /// Display label
    pub label: String,
    /// Expansion layer (0, 1 or 2)
    pub layer: u8,
    /// Node role (root, direct, downstream)
    pub role: NodeRole,
}

/// An edge as sent over the wire, referencing nodes by string id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEdge {
    /// Id of the cause node
    pub source: String,
    /// Id of the effect node
    pub target: String,
    /// Impact polarity
    pub sentiment: Sentiment,
    /// Short justification for the link
    pub rationale: String,
}

/// The serialized graph: ordered node list plus ordered edge list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphPayload {
    /// Nodes in creation order
    pub nodes: Vec<WireNode>,
    /// Edges in creation order
    pub edges: Vec<WireEdge>,
}

impl From<&CausalGraph> for GraphPayload {
    fn from(graph: &CausalGraph) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|n| WireNode {
                id: n.id.clone(),
                label: n.label.clone(),
                layer: n.layer,
                role: n.role,
            })
            .collect();
        let edges = graph
            .edges()
            .iter()
            .map(|e| WireEdge {
                source: graph.nodes()[e.source].id.clone(),
                target: graph.nodes()[e.target].id.clone(),
                sentiment: e.sentiment,
                rationale: e.rationale.clone(),
            })
            .collect();
        GraphPayload { nodes, edges }
    }
}
