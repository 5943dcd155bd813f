//! Prompt construction for impact analysis and narrative summaries

use domino_domain::{CausalGraph, ROOT};

/// Analyst persona, sent as the system message ahead of every user
/// prompt by clients that support one.
pub const ANALYST_PERSONA: &str = "You are a Senior Macro Analyst with decades of experience in \
financial markets and economic theory. You identify causal relationships between economic \
events and financial entities (assets, industries, economic indicators). Classify each \
impact as 'positive' (bullish/beneficial) or 'negative' (bearish/detrimental).";

const OUTPUT_FORMAT: &str = r#"Respond with a JSON array only, no markdown, no extra text:
[
  {"target": "affected entity", "sentiment": "positive|negative", "rationale": "brief causal explanation"}
]"#;

/// Prompt asking for `count` impacts of an event or change.
pub fn impacts(event_context: &str, count: usize) -> String {
    format!(
        "Analyze the event: '{event}'. Identify exactly {count} of the most \
significant direct impacts.\n\n{format}",
        event = event_context,
        count = count,
        format = OUTPUT_FORMAT,
    )
}

/// The context string used to expand a direct impact one layer further.
pub fn downstream_context(label: &str, root_event: &str) -> String {
    format!("Change in {} due to {}", label, root_event)
}

/// Prompt asking for one cohesive narrative paragraph over the finished
/// graph: root, direct impacts with sentiment, downstream impacts grouped
/// under their parent.
pub fn narrative(graph: &CausalGraph) -> String {
    let root = graph.root();
    let mut outline = String::new();
    for edge in graph.edges_from(ROOT) {
        let direct = &graph.nodes()[edge.target];
        outline.push_str(&format!("- {} ({})\n", direct.label, edge.sentiment));
        for sub in graph.edges_from(edge.target) {
            let downstream = &graph.nodes()[sub.target];
            outline.push_str(&format!("  - {} ({})\n", downstream.label, sub.sentiment));
        }
    }

    format!(
        "Based on the following causal chain for the event '{event}', write a \
single cohesive paragraph (approx. 100 words) summarizing the potential chain reaction. \
Focus on the most critical risks and opportunities. Use a professional financial tone.\n\n\
Causal chain:\n{outline}",
        event = root.label,
        outline = outline,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use domino_domain::{NodeRole, Sentiment};

    #[test]
    fn test_impacts_prompt_contains_event_and_count() {
        let prompt = impacts("Fed raises rates", 3);
        assert!(prompt.contains("Fed raises rates"));
        assert!(prompt.contains("exactly 3"));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn test_downstream_context() {
        let context = downstream_context("Bond Prices", "Fed raises rates");
        assert_eq!(context, "Change in Bond Prices due to Fed raises rates");
    }

    #[test]
    fn test_narrative_prompt_groups_downstream_under_parent() {
        let mut graph = CausalGraph::new("Fed raises rates");
        let bonds = graph.resolve_or_insert("Bond Prices", 1, NodeRole::Direct);
        graph.add_edge(ROOT, bonds, Sentiment::Negative, "");
        let reits = graph.resolve_or_insert("REITs", 2, NodeRole::Downstream);
        graph.add_edge(bonds, reits, Sentiment::Negative, "");

        let prompt = narrative(&graph);
        assert!(prompt.contains("Fed raises rates"));
        assert!(prompt.contains("- Bond Prices (negative)"));
        assert!(prompt.contains("  - REITs (negative)"));
        assert!(prompt.contains("chain reaction"));
    }
}
