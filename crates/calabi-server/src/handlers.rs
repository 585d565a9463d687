//! HTTP request handlers for the NLP service.
//!
//! Thin JSON adapters over [`Pipeline`]; every request runs in a span
//! carrying a fresh request id, echoed back in `x-request-id`.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use calabi_domain::{EntitySpan, EntityType, Suggestion};
use calabi_model::AnyModel;
use calabi_nlp::{HealthReport, Pipeline, PipelineError, SuggestOptions};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The pipeline, shared by all requests
    pub pipeline: Arc<Pipeline<AnyModel>>,
}

/// Entity extraction request
#[derive(Debug, Serialize, Deserialize)]
pub struct NerRequest {
    /// Raw input text
    pub text: String,
}

/// Entity extraction response
#[derive(Debug, Serialize, Deserialize)]
pub struct NerResponse {
    /// Entities ordered by position
    pub entities: Vec<EntitySpan>,
}

/// Term suggestion request
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SuggestRequest {
    /// Raw input text
    pub text: String,
    /// Seed from a span of this type (e.g. "LOCATION")
    #[serde(default)]
    pub entity_type: Option<String>,
    /// Suggestions wanted
    #[serde(default)]
    pub max_results: Option<usize>,
    /// Phrases the caller used before
    #[serde(default)]
    pub history: Vec<String>,
    /// Tags popular with the caller
    #[serde(default)]
    pub popular_tags: Vec<String>,
}

/// Term suggestion response
#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestResponse {
    /// Suggestions, best first
    pub suggestions: Vec<Suggestion>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error class (e.g. "invalid_input")
    pub kind: String,
}

/// Application error type
#[derive(Debug)]
pub struct AppError(pub PipelineError);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0 {
            PipelineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PipelineError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PipelineError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            PipelineError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        info!("Request failed with {}: {}", status, self.0);

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
            kind: self.0.kind().to_string(),
        });
        (status, body).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        AppError(e)
    }
}

/// POST /nlp/ner - Extract entities
async fn extract_entities(
    State(state): State<AppState>,
    Json(request): Json<NerRequest>,
) -> Result<Json<NerResponse>, AppError> {
    let entities = state.pipeline.extract_entities(&request.text).await?;
    Ok(Json(NerResponse { entities }))
}

/// POST /nlp/suggest - Suggest related terms
async fn suggest_terms(
    State(state): State<AppState>,
    Json(request): Json<SuggestRequest>,
) -> Result<Json<SuggestResponse>, AppError> {
    let entity_type = match request.entity_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(name) => Some(EntityType::parse(name).ok_or_else(|| {
            PipelineError::InvalidInput(format!("Unknown entity type: {}", name))
        })?),
    };

    let options = SuggestOptions {
        entity_type,
        max_results: request.max_results,
        history: request.history,
        popular_tags: request.popular_tags,
    };

    let suggestions = state.pipeline.suggest_terms(&request.text, options).await?;
    Ok(Json(SuggestResponse { suggestions }))
}

/// GET /health - Readiness check
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.pipeline.health().await;
    let status = if report.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

/// Wrap each request in a span with a fresh request id
async fn request_id(request: Request, next: Next) -> Response {
    let id = Uuid::now_v7();
    let span = info_span!(
        "request",
        request_id = %id,
        method = %request.method(),
        path = %request.uri().path()
    );

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/nlp/ner", post(extract_entities))
        .route("/nlp/suggest", post(suggest_terms))
        .route("/health", get(health_check))
        .layer(middleware::from_fn(request_id))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use calabi_model::LexiconModel;
    use calabi_nlp::PipelineConfig;
    use calabi_vocab::Vocabulary;
    use tower::ServiceExt; // for oneshot

    fn create_test_state() -> AppState {
        let pipeline = Pipeline::new(
            PipelineConfig::default(),
            Arc::new(AnyModel::from(LexiconModel::builtin())),
            Arc::new(Vocabulary::builtin()),
        )
        .unwrap();
        AppState {
            pipeline: Arc::new(pipeline),
        }
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (PipelineError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (PipelineError::ModelUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (PipelineError::Timeout(5), StatusCode::GATEWAY_TIMEOUT),
            (PipelineError::Configuration("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(AppError(error).status(), status);
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_ner() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/nlp/ner")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"text": "Lunch in Seoul"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
