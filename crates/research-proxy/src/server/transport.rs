//! HTTP transport for the research proxy.
//!
//! Routes:
//! - `POST /api/research` runs one research pipeline
//! - `GET /api/health` reports liveness
//! - anything else answers a JSON 404

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::ResearchError;
use crate::models::{ErrorBody, ResearchRequest, ResearchResult};
use crate::service::ResearchService;

/// Shared state for HTTP handlers.
#[derive(Debug)]
pub struct HttpState {
    pub service: ResearchService,
}

/// Create the HTTP router.
pub fn create_router(service: ResearchService) -> Router {
    let state = Arc::new(HttpState { service });

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/research", post(handle_research))
        .fallback(handle_not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "research-proxy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn handle_research(
    State(state): State<Arc<HttpState>>,
    payload: Result<Json<ResearchRequest>, JsonRejection>,
) -> Result<Json<ResearchResult>, ResearchError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected research request body");
        ResearchError::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let span = tracing::info_span!(
        "research",
        request_id = %Uuid::new_v4(),
        search_type = %request.search_type,
    );

    state.service.research(&request).instrument(span).await.map(Json)
}

async fn handle_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Endpoint not found", "not_found")))
}

impl IntoResponse for ResearchError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_user_message(),
            code: self.code().to_string(),
            details: self.details().cloned(),
        };

        let mut response = (self.status(), Json(body)).into_response();

        if let Self::UpstreamRateLimited { retry_after: Some(wait) } = self {
            response.headers_mut().insert(header::RETRY_AFTER, HeaderValue::from(wait.as_secs()));
        }

        response
    }
}
