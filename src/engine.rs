//! Mock engine.
//!
//! Serves one mock request: resolves the project, dispatches to an
//! endpoint, applies its policy and assembles the generated response.

use crate::assembler::{assemble, AssembleRequest, ResponseDescriptor};
use crate::config::{is_valid_project_id, EndpointDefinition, GlobalSettings, HttpMethod};
use crate::dispatcher::{self, Selection};
use crate::error::MockError;
use crate::schema::SchemaTemplate;
use crate::store::EndpointStore;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// An inbound mock request.
#[derive(Debug, Clone, Default)]
pub struct RequestDescriptor {
    pub method: String,
    /// Path after the project identifier
    pub path: String,
    pub query: HashMap<String, String>,
    /// Header names are matched case-insensitively
    pub headers: HashMap<String, String>,
}

impl RequestDescriptor {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }
}

/// Point-in-time copy of the engine counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub requests_total: u64,
    pub requests_matched: u64,
    pub requests_unmatched: u64,
    pub requests_unauthorized: u64,
    /// Number of times a schema was run through the generator
    pub generations: u64,
}

#[derive(Debug, Default)]
struct Counters {
    requests_total: AtomicU64,
    requests_matched: AtomicU64,
    requests_unmatched: AtomicU64,
    requests_unauthorized: AtomicU64,
    generations: AtomicU64,
}

/// Mock engine.
///
/// Holds no per-request state; concurrent requests share only the store
/// handle and the counters.
pub struct MockEngine {
    store: Arc<dyn EndpointStore>,
    settings: GlobalSettings,
    counters: Counters,
}

impl MockEngine {
    pub fn new(store: Arc<dyn EndpointStore>, settings: GlobalSettings) -> Self {
        info!(
            backend = store.backend_name(),
            mount_prefix = %settings.mount_prefix,
            list_cap = settings.list_cap,
            "Mock engine initialized"
        );
        Self {
            store,
            settings,
            counters: Counters::default(),
        }
    }

    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn EndpointStore> {
        &self.store
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            requests_total: self.counters.requests_total.load(Ordering::Relaxed),
            requests_matched: self.counters.requests_matched.load(Ordering::Relaxed),
            requests_unmatched: self.counters.requests_unmatched.load(Ordering::Relaxed),
            requests_unauthorized: self.counters.requests_unauthorized.load(Ordering::Relaxed),
            generations: self.counters.generations.load(Ordering::Relaxed),
        }
    }

    /// Serve a mock request for `project_id`.
    pub async fn handle(
        &self,
        project_id: &str,
        request: &RequestDescriptor,
    ) -> Result<ResponseDescriptor, MockError> {
        self.counters.requests_total.fetch_add(1, Ordering::Relaxed);

        if !is_valid_project_id(project_id) {
            return Err(MockError::InvalidProjectReference(project_id.to_string()));
        }
        let project = self
            .store
            .find_project(project_id)
            .await?
            .ok_or_else(|| MockError::InvalidProjectReference(project_id.to_string()))?;

        let endpoints = self.store.find_endpoints_by_project(project_id).await?;

        let selection = request
            .method
            .parse::<HttpMethod>()
            .ok()
            .and_then(|method| dispatcher::select(method, &request.path, &endpoints));

        let Some(Selection { endpoint, params }) = selection else {
            self.counters.requests_unmatched.fetch_add(1, Ordering::Relaxed);
            if self.settings.log_unmatched {
                warn!(
                    project = %project_id,
                    method = %request.method,
                    path = %request.path,
                    "No matching endpoint found"
                );
            }
            return Err(MockError::NoMatchingEndpoint {
                method: request.method.to_uppercase(),
                path: request.path.clone(),
            });
        };

        self.counters.requests_matched.fetch_add(1, Ordering::Relaxed);
        if self.settings.log_matches {
            info!(
                project = %project_id,
                method = %endpoint.method,
                pattern = %endpoint.path,
                path = %request.path,
                "Request matched endpoint"
            );
        }

        if let Err(e) = dispatcher::authorize(
            endpoint,
            &project,
            &request.headers,
            &self.settings.api_key_header,
        ) {
            self.counters
                .requests_unauthorized
                .fetch_add(1, Ordering::Relaxed);
            return Err(e);
        }

        dispatcher::apply_delay(endpoint).await;

        let status = dispatcher::response_status(endpoint)?;
        let template = SchemaTemplate::from_stored(&endpoint.schema_definition).map_err(|e| {
            MockError::InvalidSchemaDefinition {
                path: endpoint.path.clone(),
                reason: e.to_string(),
            }
        })?;

        let assemble_request = AssembleRequest {
            params: &params,
            query: &request.query,
            status,
            list_cap: self.settings.list_cap,
        };
        Ok(self.render(endpoint, &template, &assemble_request))
    }

    fn render(
        &self,
        endpoint: &EndpointDefinition,
        template: &SchemaTemplate,
        request: &AssembleRequest<'_>,
    ) -> ResponseDescriptor {
        self.counters.generations.fetch_add(1, Ordering::Relaxed);
        let mut rng = rand::thread_rng();
        assemble(endpoint, template, request, &mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::ResponseBody;
    use crate::config::MockServerConfig;
    use crate::store::InMemoryStore;
    use std::time::Duration;

    fn test_config() -> MockServerConfig {
        let yaml = r#"
projects:
  - id: shop
    api_keys: [project-key]
    endpoints:
      - path: /items
        method: GET
        response_type: list
        count: 3
        schema_definition:
          id: "(random:uuid)"
          label: fixed

      - path: /items
        method: GET
        response_type: single
        parameter_path: ":id"
        schema_definition:
          id: "(random:integer)"
          name: "(random:name)"

      - path: /secret
        require_auth: true
        api_keys: [endpoint-key]
        schema_definition:
          token: "(random:string)"

      - path: /broken-status
        response_http_status: "299"

      - path: /broken-schema
        schema_definition: "{not json"

      - path: /items/:id
        method: DELETE
        response_http_status: "204"

      - path: /slow
        delay: 2000
        response_type: single
        schema_definition:
          ok: true
"#;
        MockServerConfig::from_yaml(yaml).unwrap()
    }

    fn engine() -> MockEngine {
        let config = test_config();
        let store = Arc::new(InMemoryStore::from_config(&config));
        MockEngine::new(store, config.settings)
    }

    #[tokio::test]
    async fn test_list_end_to_end() {
        let engine = engine();
        let response = engine
            .handle("shop", &RequestDescriptor::new("GET", "/items"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let data = response.json().unwrap()["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);

        let mut ids = Vec::new();
        for item in data {
            assert_eq!(item["label"], "fixed");
            let id = item["id"].as_str().unwrap();
            assert!(uuid::Uuid::parse_str(id).is_ok());
            ids.push(id.to_string());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn test_single_item_echoes_identifier() {
        let engine = engine();
        let response = engine
            .handle("shop", &RequestDescriptor::new("get", "/items/42"))
            .await
            .unwrap();

        let body = response.json().unwrap();
        assert_eq!(body["id"], "42");
        assert!(body["name"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_project() {
        let engine = engine();
        let err = engine
            .handle("nope", &RequestDescriptor::new("GET", "/items"))
            .await
            .unwrap_err();
        assert!(matches!(err, MockError::InvalidProjectReference(_)));

        let err = engine
            .handle("../etc", &RequestDescriptor::new("GET", "/items"))
            .await
            .unwrap_err();
        assert!(matches!(err, MockError::InvalidProjectReference(_)));
    }

    #[tokio::test]
    async fn test_no_matching_endpoint() {
        let engine = engine();
        let err = engine
            .handle("shop", &RequestDescriptor::new("POST", "/items"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("POST /items"));

        let err = engine
            .handle("shop", &RequestDescriptor::new("OPTIONS", "/items"))
            .await
            .unwrap_err();
        assert!(matches!(err, MockError::NoMatchingEndpoint { .. }));
        assert_eq!(engine.stats().requests_unmatched, 2);
    }

    #[tokio::test]
    async fn test_auth_gate_skips_generation() {
        let engine = engine();

        let err = engine
            .handle("shop", &RequestDescriptor::new("GET", "/secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, MockError::Unauthorized(_)));

        let err = engine
            .handle(
                "shop",
                &RequestDescriptor::new("GET", "/secret").with_header("x-api-key", "nope"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MockError::Unauthorized(_)));

        let stats = engine.stats();
        assert_eq!(stats.generations, 0);
        assert_eq!(stats.requests_unauthorized, 2);

        for key in ["endpoint-key", "project-key"] {
            let response = engine
                .handle(
                    "shop",
                    &RequestDescriptor::new("GET", "/secret").with_header("X-API-Key", key),
                )
                .await
                .unwrap();
            assert_eq!(response.status, 200);
        }
        assert_eq!(engine.stats().generations, 2);
    }

    #[tokio::test]
    async fn test_misconfigured_status() {
        let engine = engine();
        let err = engine
            .handle("shop", &RequestDescriptor::new("GET", "/broken-status"))
            .await
            .unwrap_err();
        assert!(matches!(err, MockError::MisconfiguredStatusCode { .. }));
        assert_eq!(err.status().as_u16(), 500);
    }

    #[tokio::test]
    async fn test_invalid_schema_fails_request() {
        let engine = engine();
        let err = engine
            .handle("shop", &RequestDescriptor::new("GET", "/broken-schema"))
            .await
            .unwrap_err();
        assert!(matches!(err, MockError::InvalidSchemaDefinition { .. }));
        assert_eq!(engine.stats().generations, 0);
    }

    #[tokio::test]
    async fn test_delete_returns_empty_body() {
        let engine = engine();
        let response = engine
            .handle("shop", &RequestDescriptor::new("DELETE", "/items/3"))
            .await
            .unwrap();
        assert_eq!(response.status, 204);
        assert_eq!(response.body, ResponseBody::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_before_response() {
        let engine = engine();
        let start = tokio::time::Instant::now();
        let response = engine
            .handle("shop", &RequestDescriptor::new("GET", "/slow"))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(2000));
        assert_eq!(response.json().unwrap()["ok"], true);
    }

    #[tokio::test]
    async fn test_store_changes_are_seen() {
        let config = test_config();
        let store = Arc::new(InMemoryStore::from_config(&config));
        let engine = MockEngine::new(store.clone(), config.settings.clone());

        let mut project = config.projects[0].clone();
        project.endpoints.insert(
            0,
            crate::config::EndpointDefinition::new("/fresh", serde_json::json!({"v": 1})),
        );
        store.upsert_project(&project).await;

        let response = engine
            .handle("shop", &RequestDescriptor::new("GET", "/fresh"))
            .await
            .unwrap();
        assert_eq!(response.json().unwrap()["data"][0]["v"], 1);
    }

    #[tokio::test]
    async fn test_counters() {
        let engine = engine();
        assert_eq!(engine.stats(), EngineStats::default());

        let _ = engine
            .handle("shop", &RequestDescriptor::new("GET", "/items"))
            .await;
        let _ = engine
            .handle("shop", &RequestDescriptor::new("GET", "/missing"))
            .await;

        let stats = engine.stats();
        assert_eq!(stats.requests_total, 2);
        assert_eq!(stats.requests_matched, 1);
        assert_eq!(stats.requests_unmatched, 1);
        assert_eq!(stats.generations, 1);
    }
}
