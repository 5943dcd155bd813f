//! Narrative summaries over a finished graph
//!
//! One extra model call that turns the graph into prose. Failing here
//! must never fail the request; the caller drops the narrative and
//! returns the graph alone.

use crate::config::EngineConfig;
use crate::prompt;
use domino_domain::CausalGraph;
use domino_llm::{LanguageModel, LlmError};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::debug;

/// Produces a one-paragraph narrative for an expansion result
pub struct NarrativeSummarizer<L: LanguageModel> {
    model: Arc<L>,
    config: EngineConfig,
}

impl<L: LanguageModel> NarrativeSummarizer<L> {
    /// Create a summarizer over a shared model client
    pub fn new(model: Arc<L>, config: EngineConfig) -> Self {
        Self { model, config }
    }

    /// Summarize the graph in a single completion call.
    ///
    /// No retries; the narrative is an enhancement, not a dependency of
    /// graph correctness.
    pub async fn summarize(&self, graph: &CausalGraph) -> Result<String, LlmError> {
        let prompt = prompt::narrative(graph);
        debug!(chars = prompt.len(), "narrative prompt built");
        let response = timeout(self.config.request_timeout(), self.model.complete(&prompt))
            .await
            .map_err(|_| LlmError::Timeout)??;
        let narrative = response.trim().to_string();
        if narrative.is_empty() {
            return Err(LlmError::InvalidResponse("empty narrative".to_string()));
        }
        Ok(narrative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domino_domain::{NodeRole, Sentiment, ROOT};
    use domino_llm::ScriptedModel;

    fn sample_graph() -> CausalGraph {
        let mut graph = CausalGraph::new("Oil supply shock");
        let airlines = graph.resolve_or_insert("Airline Stocks", 1, NodeRole::Direct);
        graph.add_edge(ROOT, airlines, Sentiment::Negative, "fuel costs");
        graph
    }

    #[tokio::test]
    async fn test_summarize_returns_trimmed_text() {
        let model = Arc::new(
            ScriptedModel::new().with_default("  A hawkish surprise ripples outward.  \n"),
        );
        let summarizer = NarrativeSummarizer::new(model, EngineConfig::fast_test());
        let narrative = summarizer.summarize(&sample_graph()).await.unwrap();
        assert_eq!(narrative, "A hawkish surprise ripples outward.");
    }

    #[tokio::test]
    async fn test_summarize_failure_propagates_to_caller() {
        let model = Arc::new(ScriptedModel::new().fail_when("chain reaction"));
        let summarizer = NarrativeSummarizer::new(model, EngineConfig::fast_test());
        assert!(summarizer.summarize(&sample_graph()).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_narrative_is_an_error() {
        let model = Arc::new(ScriptedModel::new().with_default("   "));
        let summarizer = NarrativeSummarizer::new(model, EngineConfig::fast_test());
        let err = summarizer.summarize(&sample_graph()).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }
}
