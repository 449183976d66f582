//! HTTP boundary.
//!
//! Mounts the engine at `/{mount_prefix}/{project_id}/{*path}` and exposes a
//! health endpoint.

use crate::assembler::{ResponseBody, ResponseDescriptor};
use crate::engine::{EngineStats, MockEngine, RequestDescriptor};
use crate::error::MockError;
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared handler state.
pub type SharedEngine = Arc<MockEngine>;

/// Build the router for `engine`.
pub fn build_router(engine: SharedEngine) -> Router {
    let prefix = engine.settings().mount_prefix.clone();

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    Router::new()
        .route("/health", get(health_check))
        .route(&format!("/{}/{{project_id}}", prefix), any(handle_mock))
        .route(&format!("/{}/{{project_id}}/", prefix), any(handle_mock))
        .route(&format!("/{}/{{project_id}}/{{*path}}", prefix), any(handle_mock))
        .layer(trace_layer)
        .with_state(engine)
}

/// Flatten request headers to one value per lower-case name.
fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

async fn handle_mock(
    State(engine): State<SharedEngine>,
    method: Method,
    segments: Result<Path<HashMap<String, String>>, PathRejection>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    headers: HeaderMap,
) -> Response {
    // Rejections still get the JSON error body.
    let (Path(segments), Query(query)) = match (segments, query) {
        (Ok(segments), Ok(query)) => (segments, query),
        (Err(e), _) => return MockError::BadRequest(e.body_text()).into_response(),
        (_, Err(e)) => return MockError::BadRequest(e.body_text()).into_response(),
    };

    let project_id = segments.get("project_id").cloned().unwrap_or_default();
    let path = format!(
        "/{}",
        segments
            .get("path")
            .map(|p| p.trim_start_matches('/'))
            .unwrap_or("")
    );

    let request = RequestDescriptor {
        method: method.as_str().to_string(),
        path,
        query,
        headers: flatten_headers(&headers),
    };

    match engine.handle(&project_id, &request).await {
        Ok(response) => response.into_response(),
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for ResponseDescriptor {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self.body {
            ResponseBody::Json(value) => (status, Json(value)).into_response(),
            ResponseBody::Empty => status.into_response(),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    backend: &'static str,
    projects: Option<usize>,
    stats: EngineStats,
}

async fn health_check(State(engine): State<SharedEngine>) -> Json<HealthResponse> {
    let projects = engine.store().project_count().await.ok();
    Json(HealthResponse {
        status: if projects.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        backend: engine.store().backend_name(),
        projects,
        stats: engine.stats(),
    })
}
