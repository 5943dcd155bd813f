//! HTTP request handlers for the analysis service.
//!
//! Implements the analyze and health endpoints using axum. The analyze
//! handler owns the fail-soft narrative policy: a summarizer failure
//! drops the narrative, never the response.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use domino_domain::GraphPayload;
use domino_engine::{CausalExpander, ExpansionError, NarrativeSummarizer};
use domino_llm::LanguageModel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

/// Shared application state
pub struct AppState<L: LanguageModel> {
    /// The expansion engine
    pub expander: Arc<CausalExpander<L>>,
    /// The narrative summarizer (same model client)
    pub summarizer: Arc<NarrativeSummarizer<L>>,
    /// Whether responses include a narrative paragraph
    pub narrative_enabled: bool,
    /// Model identifier reported by the health endpoint
    pub model_name: String,
}

impl<L: LanguageModel> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            expander: Arc::clone(&self.expander),
            summarizer: Arc::clone(&self.summarizer),
            narrative_enabled: self.narrative_enabled,
            model_name: self.model_name.clone(),
        }
    }
}

/// Analysis request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// The root event to expand
    pub event: String,
    /// Requested number of direct impacts (defaults from config)
    #[serde(default)]
    pub direct_count: Option<usize>,
    /// Requested number of downstream impacts per direct impact
    #[serde(default)]
    pub downstream_count: Option<usize>,
}

/// Analysis response: the serialized graph plus an optional narrative
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// Nodes and edges in creation order
    #[serde(flatten)]
    pub graph: GraphPayload,
    /// Narrative paragraph; omitted when summarization failed or is disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Liveness status
    pub status: String,
    /// Configured model identifier
    pub model: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

/// Application error type mapped onto HTTP statuses.
///
/// The split matters to clients: 400/422 mean "fix your input", 503 means
/// "try again later".
#[derive(Debug)]
pub enum AppError {
    /// User-correctable input problem (HTTP 400)
    Validation {
        /// Error code for the response body
        code: &'static str,
        /// Message for the response body
        message: String,
    },
    /// The model produced nothing usable for this event (HTTP 422)
    NoDirectImpacts,
    /// The model capability is unavailable after retries (HTTP 503)
    Upstream(String),
}

impl From<ExpansionError> for AppError {
    fn from(e: ExpansionError) -> Self {
        match e {
            ExpansionError::EmptyEvent | ExpansionError::EventTooLong(_, _) => {
                AppError::Validation {
                    code: "invalid_event",
                    message: e.to_string(),
                }
            }
            ExpansionError::InvalidFanout => AppError::Validation {
                code: "invalid_fanout",
                message: e.to_string(),
            },
            ExpansionError::NoDirectImpacts => AppError::NoDirectImpacts,
            ExpansionError::Upstream(reason) => AppError::Upstream(reason),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Validation { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::NoDirectImpacts => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "no_direct_impacts",
                "could not analyze this event".to_string(),
            ),
            AppError::Upstream(reason) => (StatusCode::SERVICE_UNAVAILABLE, "upstream_unavailable", reason),
        };

        let body = Json(ErrorResponse {
            code: code.to_string(),
            message,
        });
        let mut response = (status, body).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, header::HeaderValue::from_static("5"));
        }
        response
    }
}

/// POST /analyze - Expand an event into a causal graph
async fn analyze<L: LanguageModel + 'static>(
    State(state): State<AppState<L>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let request_id = Uuid::now_v7();
    let span = info_span!("analyze", %request_id);

    async move {
        let config = state.expander.config();
        let direct_count = request.direct_count.unwrap_or(config.direct_count);
        let downstream_count = request.downstream_count.unwrap_or(config.downstream_count);

        let graph = state
            .expander
            .expand(&request.event, direct_count, downstream_count)
            .await?;

        let narrative = if state.narrative_enabled {
            match state.summarizer.summarize(&graph).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(error = %e, "narrative summarization failed, returning graph alone");
                    None
                }
            }
        } else {
            None
        };

        Ok(Json(AnalyzeResponse {
            graph: GraphPayload::from(&graph),
            narrative,
        }))
    }
    .instrument(span)
    .await
}

/// GET /health - Liveness probe
async fn health<L: LanguageModel + 'static>(
    State(state): State<AppState<L>>,
) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        model: state.model_name,
    })
}

/// Create the axum router with all routes
pub fn create_router<L: LanguageModel + 'static>(state: AppState<L>) -> AxumRouter {
    AxumRouter::new()
        .route("/analyze", post(analyze::<L>))
        .route("/health", get(health::<L>))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use domino_engine::EngineConfig;
    use domino_llm::ScriptedModel;
    use serde_json::Value;
    use tower::ServiceExt; // for oneshot

    const EVENT: &str = "Fed raises interest rates by 50bps";

    const DIRECT_RESPONSE: &str = r#"[
        {"target": "Bond Prices", "sentiment": "negative", "rationale": "yields rise"},
        {"target": "USD Strength", "sentiment": "positive", "rationale": "rate differential"},
        {"target": "Tech Stocks", "sentiment": "negative", "rationale": "higher discount rates"}
    ]"#;

    fn create_test_state(model: ScriptedModel) -> AppState<ScriptedModel> {
        let model = Arc::new(model);
        let config = EngineConfig::fast_test();
        AppState {
            expander: Arc::new(CausalExpander::new(Arc::clone(&model), config.clone())),
            summarizer: Arc::new(NarrativeSummarizer::new(model, config)),
            narrative_enabled: true,
            model_name: "scripted".to_string(),
        }
    }

    // Narrative prompts ask for a "chain reaction" paragraph; downstream
    // prompts start with "Change in". Needle order disambiguates.
    fn happy_model() -> ScriptedModel {
        ScriptedModel::new()
            .respond_when("chain reaction", "A hawkish surprise ripples through markets.")
            .respond_when("Change in", "[]")
            .respond_when(EVENT, DIRECT_RESPONSE)
    }

    fn analyze_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let app = create_router(create_test_state(happy_model()));
        let body = format!(r#"{{"event": "{}"}}"#, EVENT);

        let response = app.oneshot(analyze_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["nodes"].as_array().unwrap().len(), 4);
        assert_eq!(json["edges"].as_array().unwrap().len(), 3);
        assert_eq!(json["nodes"][0]["role"], "root");
        assert_eq!(
            json["narrative"],
            "A hawkish surprise ripples through markets."
        );
    }

    #[tokio::test]
    async fn test_analyze_respects_requested_counts() {
        let app = create_router(create_test_state(happy_model()));
        let body = format!(r#"{{"event": "{}", "directCount": 1, "downstreamCount": 1}}"#, EVENT);

        let response = app.oneshot(analyze_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(json["edges"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_empty_event_is_400() {
        let app = create_router(create_test_state(happy_model()));

        let response = app
            .oneshot(analyze_request(r#"{"event": "   "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["code"], "invalid_event");
    }

    #[tokio::test]
    async fn test_analyze_zero_fanout_is_400() {
        let app = create_router(create_test_state(happy_model()));
        let body = format!(r#"{{"event": "{}", "directCount": 0}}"#, EVENT);

        let response = app.oneshot(analyze_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["code"], "invalid_fanout");
    }

    #[tokio::test]
    async fn test_analyze_no_impacts_is_422() {
        let model = ScriptedModel::new().respond_when(EVENT, "[]");
        let app = create_router(create_test_state(model));
        let body = format!(r#"{{"event": "{}"}}"#, EVENT);

        let response = app.oneshot(analyze_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert_eq!(json["code"], "no_direct_impacts");
    }

    #[tokio::test]
    async fn test_analyze_upstream_failure_is_503_with_retry_after() {
        let model = ScriptedModel::new().fail_when(EVENT);
        let app = create_router(create_test_state(model));
        let body = format!(r#"{{"event": "{}"}}"#, EVENT);

        let response = app.oneshot(analyze_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "5");

        let json = body_json(response).await;
        assert_eq!(json["code"], "upstream_unavailable");
    }

    #[tokio::test]
    async fn test_narrative_failure_is_soft() {
        let model = ScriptedModel::new()
            .fail_when("chain reaction")
            .respond_when("Change in", "[]")
            .respond_when(EVENT, DIRECT_RESPONSE);
        let app = create_router(create_test_state(model));
        let body = format!(r#"{{"event": "{}"}}"#, EVENT);

        let response = app.oneshot(analyze_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["nodes"].as_array().unwrap().len(), 4);
        assert!(json.get("narrative").is_none());
    }

    #[tokio::test]
    async fn test_narrative_disabled_by_config() {
        let mut state = create_test_state(happy_model());
        state.narrative_enabled = false;
        let app = create_router(state);
        let body = format!(r#"{{"event": "{}"}}"#, EVENT);

        let response = app.oneshot(analyze_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert!(json.get("narrative").is_none());
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state(happy_model()));

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model"], "scripted");
    }
}
