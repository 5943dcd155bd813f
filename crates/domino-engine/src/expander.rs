//! The recursive (bounded, depth-2) causal expansion

use crate::config::EngineConfig;
use crate::error::ExpansionError;
use crate::parser::{parse_impacts, ImpactBatch};
use crate::prompt;
use domino_domain::{display_label, CausalGraph, NodeRole, ROOT};
use domino_llm::LanguageModel;
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// Drives one expansion: root event → direct impacts → downstream impacts.
///
/// Each invocation builds its own [`CausalGraph`]; nothing is shared
/// across requests beyond the pooled model client.
pub struct CausalExpander<L: LanguageModel> {
    model: Arc<L>,
    config: EngineConfig,
}

impl<L: LanguageModel + 'static> CausalExpander<L> {
    /// Create an expander over a shared model client
    pub fn new(model: Arc<L>, config: EngineConfig) -> Self {
        Self { model, config }
    }

    /// The engine configuration in use
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Expand a root event into a two-layer causal graph.
    ///
    /// Fails before any outbound call for empty/oversized input or a zero
    /// fanout. After that only root-step failures propagate: an exhausted
    /// root call yields [`ExpansionError::Upstream`], a root call with
    /// zero usable candidates yields [`ExpansionError::NoDirectImpacts`].
    /// Failed downstream branches are logged and skipped.
    pub async fn expand(
        &self,
        root_event: &str,
        direct_count: usize,
        downstream_count: usize,
    ) -> Result<CausalGraph, ExpansionError> {
        let event = display_label(root_event);
        if event.is_empty() {
            return Err(ExpansionError::EmptyEvent);
        }
        let event_len = event.chars().count();
        if event_len > self.config.max_event_len {
            return Err(ExpansionError::EventTooLong(
                event_len,
                self.config.max_event_len,
            ));
        }
        if direct_count == 0 || downstream_count == 0 {
            return Err(ExpansionError::InvalidFanout);
        }
        let direct_count = direct_count.min(self.config.max_fanout);
        let downstream_count = downstream_count.min(self.config.max_fanout);

        info!(%event, direct_count, downstream_count, "starting expansion");
        let mut graph = CausalGraph::new(&event);

        // Step 2: direct impacts of the root
        let batch = Self::analyze(
            Arc::clone(&self.model),
            self.config.clone(),
            event.clone(),
            direct_count,
        )
        .await
        .map_err(ExpansionError::Upstream)?;
        if batch.dropped > 0 {
            warn!(dropped = batch.dropped, "dropped malformed direct candidates");
        }
        if batch.candidates.is_empty() {
            return Err(ExpansionError::NoDirectImpacts);
        }

        let mut frontier: Vec<usize> = Vec::new();
        for candidate in batch.candidates.into_iter().take(direct_count) {
            let idx = graph.resolve_or_insert(&candidate.target, 1, NodeRole::Direct);
            if !graph.add_edge(ROOT, idx, candidate.sentiment, candidate.rationale) {
                debug!(target = %graph.nodes()[idx].label, "duplicate direct edge dropped");
            }
            // Only nodes actually living at layer 1 get expanded further;
            // a candidate collapsed onto the root stays where it is.
            let at_layer_one = graph.node(idx).map(|n| n.layer == 1).unwrap_or(false);
            if at_layer_one && !frontier.contains(&idx) {
                frontier.push(idx);
            }
        }

        // Step 3: downstream impacts, one concurrent task per layer-1 node
        let mut handles = Vec::with_capacity(frontier.len());
        for &idx in &frontier {
            let label = graph.nodes()[idx].label.clone();
            let context = prompt::downstream_context(&label, &event);
            let model = Arc::clone(&self.model);
            let config = self.config.clone();
            handles.push(tokio::spawn(async move {
                match Self::analyze(model, config, context, downstream_count).await {
                    Ok(batch) => {
                        if batch.dropped > 0 {
                            warn!(
                                %label,
                                dropped = batch.dropped,
                                "dropped malformed downstream candidates"
                            );
                        }
                        batch.candidates
                    }
                    Err(reason) => {
                        warn!(%label, %reason, "downstream branch failed, skipping");
                        Vec::new()
                    }
                }
            }));
        }

        // Merge in frontier order so the graph shape never depends on
        // task completion order.
        for (&parent, handle) in frontier.iter().zip(handles) {
            let candidates = match handle.await {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(error = %e, "downstream task aborted, skipping branch");
                    Vec::new()
                }
            };
            for candidate in candidates.into_iter().take(downstream_count) {
                let idx = graph.resolve_or_insert(&candidate.target, 2, NodeRole::Downstream);
                if !graph.add_edge(parent, idx, candidate.sentiment, candidate.rationale) {
                    debug!(target = %graph.nodes()[idx].label, "duplicate downstream edge dropped");
                }
            }
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "expansion complete"
        );
        Ok(graph)
    }

    /// One analysis step with bounded retries: prompt, complete under a
    /// timeout, parse. A timeout, transport error, or unparseable body all
    /// count as a failed attempt.
    async fn analyze(
        model: Arc<L>,
        config: EngineConfig,
        context: String,
        count: usize,
    ) -> Result<ImpactBatch, String> {
        let prompt = prompt::impacts(&context, count);
        debug!(chars = prompt.len(), "prompt built");
        let mut attempt: u32 = 0;
        loop {
            let failure = match timeout(config.request_timeout(), model.complete(&prompt)).await {
                Err(_) => "request timed out".to_string(),
                Ok(Err(e)) => e.to_string(),
                Ok(Ok(response)) => {
                    debug!(chars = response.len(), "model response received");
                    match parse_impacts(&response, &config.parse_options()) {
                        Ok(batch) => return Ok(batch),
                        Err(e) => e.to_string(),
                    }
                }
            };
            if attempt >= config.max_retries {
                return Err(failure);
            }
            let delay = config.backoff_delay(attempt);
            warn!(
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                %failure,
                "analysis call failed, retrying"
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}
