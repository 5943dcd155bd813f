//! The causal graph container and label normalization
//!
//! The expansion is bounded (depth 2, fixed fanout), so nodes live in an
//! arena `Vec` and edges reference them by index. Deduplication is by
//! normalized-label equality; the node created first keeps its (lower)
//! layer and later mentions resolve to it.

use crate::sentiment::{NodeRole, Sentiment};
use std::collections::{HashMap, HashSet};

/// Arena index of the root node (always created first)
pub const ROOT: usize = 0;

/// Collapse whitespace runs and trim, preserving case.
///
/// This is the stored display form of a label.
pub fn display_label(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalization key used for dedup: collapsed whitespace, lowercased.
pub fn normalize_label(text: &str) -> String {
    display_label(text).to_lowercase()
}

/// Stable node id: first 16 hex chars of the blake3 hash of the
/// normalized label. Identical text always yields the same id.
pub fn node_id(normalized: &str) -> String {
    let hash = blake3::hash(normalized.as_bytes());
    hash.to_hex()[..16].to_string()
}

/// A single event or affected entity in the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Stable content-hash id (see [`node_id`])
    pub id: String,
    /// Human-readable label, whitespace-collapsed
    pub label: String,
    /// Expansion layer: 0 root, 1 direct, 2 downstream
    pub layer: u8,
    /// Role corresponding to the layer the node was first created at
    pub role: NodeRole,
}

/// A directed cause → effect link between two arena indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Arena index of the cause
    pub source: usize,
    /// Arena index of the effect
    pub target: usize,
    /// Impact polarity
    pub sentiment: Sentiment,
    /// Short free-text justification for the link
    pub rationale: String,
}

/// A bounded, deduplicated directed graph built by one expansion.
///
/// Owned by a single request; nodes and edges are kept in creation order
/// so serialization is deterministic.
#[derive(Debug)]
pub struct CausalGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    by_label: HashMap<String, usize>,
    edge_pairs: HashSet<(usize, usize)>,
}

impl CausalGraph {
    /// Create a graph containing only the root node at layer 0.
    ///
    /// The caller is responsible for rejecting empty root text first.
    pub fn new(root_label: &str) -> Self {
        let mut graph = CausalGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
            by_label: HashMap::new(),
            edge_pairs: HashSet::new(),
        };
        graph.insert(root_label, 0, NodeRole::Root);
        graph
    }

    /// Resolve a label to its existing node, or create one at the given
    /// layer. A label seen before keeps the node created first — lowest
    /// layer wins, and the original role and label casing are retained.
    pub fn resolve_or_insert(&mut self, label: &str, layer: u8, role: NodeRole) -> usize {
        let key = normalize_label(label);
        if let Some(&idx) = self.by_label.get(&key) {
            return idx;
        }
        self.insert(label, layer, role)
    }

    fn insert(&mut self, label: &str, layer: u8, role: NodeRole) -> usize {
        let label = display_label(label);
        let key = label.to_lowercase();
        let idx = self.nodes.len();
        self.nodes.push(Node {
            id: node_id(&key),
            label,
            layer,
            role,
        });
        self.by_label.insert(key, idx);
        idx
    }

    /// Add a directed edge, dropping duplicates.
    ///
    /// Returns `false` when an edge for the same `(source, target)` pair
    /// already exists; the first rationale wins.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds — edges may only reference
    /// nodes of this graph.
    pub fn add_edge(
        &mut self,
        source: usize,
        target: usize,
        sentiment: Sentiment,
        rationale: impl Into<String>,
    ) -> bool {
        assert!(source < self.nodes.len() && target < self.nodes.len());
        if !self.edge_pairs.insert((source, target)) {
            return false;
        }
        self.edges.push(Edge {
            source,
            target,
            sentiment,
            rationale: rationale.into(),
        });
        true
    }

    /// Nodes in creation order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in creation order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Node at an arena index
    pub fn node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)
    }

    /// The root node
    pub fn root(&self) -> &Node {
        &self.nodes[ROOT]
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges originating at the given node, in creation order
    pub fn edges_from(&self, source: usize) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.source == source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_graph_has_root_only() {
        let graph = CausalGraph::new("Fed raises rates");
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.root().layer, 0);
        assert_eq!(graph.root().role, NodeRole::Root);
        assert_eq!(graph.root().label, "Fed raises rates");
    }

    #[test]
    fn test_normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize_label("  Bond \t Prices \n"), "bond prices");
        assert_eq!(display_label("  Bond \t Prices \n"), "Bond Prices");
    }

    #[test]
    fn test_node_id_is_stable() {
        let a = node_id("bond prices");
        let b = node_id("bond prices");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, node_id("usd strength"));
    }

    #[test]
    fn test_dedup_by_normalized_label() {
        let mut graph = CausalGraph::new("Event");
        let a = graph.resolve_or_insert("Bond Prices", 1, NodeRole::Direct);
        let b = graph.resolve_or_insert("  bond   prices ", 2, NodeRole::Downstream);
        assert_eq!(a, b);
        assert_eq!(graph.node_count(), 2);
        // First creation wins: layer, role and casing are retained
        let node = graph.node(a).unwrap();
        assert_eq!(node.layer, 1);
        assert_eq!(node.role, NodeRole::Direct);
        assert_eq!(node.label, "Bond Prices");
    }

    #[test]
    fn test_dedup_against_root() {
        let mut graph = CausalGraph::new("Oil Prices");
        let idx = graph.resolve_or_insert("oil prices", 1, NodeRole::Direct);
        assert_eq!(idx, ROOT);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node(idx).unwrap().layer, 0);
    }

    #[test]
    fn test_duplicate_edges_dropped_first_rationale_wins() {
        let mut graph = CausalGraph::new("Event");
        let a = graph.resolve_or_insert("A", 1, NodeRole::Direct);
        assert!(graph.add_edge(ROOT, a, Sentiment::Negative, "first"));
        assert!(!graph.add_edge(ROOT, a, Sentiment::Positive, "second"));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].rationale, "first");
        assert_eq!(graph.edges()[0].sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_opposite_direction_is_not_a_duplicate() {
        let mut graph = CausalGraph::new("Event");
        let a = graph.resolve_or_insert("A", 1, NodeRole::Direct);
        assert!(graph.add_edge(ROOT, a, Sentiment::Positive, ""));
        assert!(graph.add_edge(a, ROOT, Sentiment::Positive, ""));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_creation_order_preserved() {
        let mut graph = CausalGraph::new("Event");
        let a = graph.resolve_or_insert("A", 1, NodeRole::Direct);
        let b = graph.resolve_or_insert("B", 1, NodeRole::Direct);
        let c = graph.resolve_or_insert("C", 2, NodeRole::Downstream);
        graph.add_edge(ROOT, a, Sentiment::Positive, "");
        graph.add_edge(ROOT, b, Sentiment::Negative, "");
        graph.add_edge(a, c, Sentiment::Positive, "");
        let labels: Vec<_> = graph.nodes().iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Event", "A", "B", "C"]);
        let pairs: Vec<_> = graph.edges().iter().map(|e| (e.source, e.target)).collect();
        assert_eq!(pairs, vec![(ROOT, a), (ROOT, b), (a, c)]);
    }

    #[test]
    fn test_edges_from() {
        let mut graph = CausalGraph::new("Event");
        let a = graph.resolve_or_insert("A", 1, NodeRole::Direct);
        let b = graph.resolve_or_insert("B", 1, NodeRole::Direct);
        let c = graph.resolve_or_insert("C", 2, NodeRole::Downstream);
        graph.add_edge(ROOT, a, Sentiment::Positive, "");
        graph.add_edge(ROOT, b, Sentiment::Negative, "");
        graph.add_edge(a, c, Sentiment::Positive, "");
        assert_eq!(graph.edges_from(ROOT).count(), 2);
        assert_eq!(graph.edges_from(a).count(), 1);
        assert_eq!(graph.edges_from(c).count(), 0);
    }
}
