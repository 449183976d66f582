use axum::body::Body;
use axum::http::{Request, StatusCode};
use mock_api_server::server::build_router;
use mock_api_server::store::InMemoryStore;
use mock_api_server::{MockEngine, MockServerConfig};
use std::sync::Arc;
use tower::ServiceExt;

const CONFIG: &str = r#"
settings:
  mount_prefix: mock
  list_cap: 5
projects:
  - id: demo
    endpoints:
      - path: /items
        count: 3
        schema_definition:
          id: "(random:uuid)"
          label: fixed
      - path: /items
        response_type: single
        parameter_path: ":id"
        schema_definition:
          id: "(random:integer)"
          title: "(random:sentences)"
      - path: /pages
        count: 50
        support_pagination: true
        schema_definition:
          n: "(random:number)"
      - path: /private
        require_auth: true
        api_keys: [s3cret]
      - path: /items/:id
        method: DELETE
      - path: /bad
        response_http_status: "418"
"#;

fn app() -> axum::Router {
    let config = MockServerConfig::from_yaml(CONFIG).expect("config");
    let store = Arc::new(InMemoryStore::from_config(&config));
    build_router(Arc::new(MockEngine::new(store, config.settings)))
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn list_endpoint_returns_generated_items() {
    let response = app().oneshot(request("GET", "/mock/demo/items")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let data = body["data"].as_array().expect("data array");
    assert_eq!(data.len(), 3);
    for item in data {
        assert_eq!(item["label"], "fixed");
        assert!(uuid::Uuid::parse_str(item["id"].as_str().unwrap()).is_ok());
    }
}

#[tokio::test]
async fn single_endpoint_echoes_path_parameter() {
    let response = app()
        .oneshot(request("GET", "/mock/demo/items/abc-1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["id"], "abc-1");
    assert!(body["title"].is_string());
}

#[tokio::test]
async fn pagination_uses_query_parameters() {
    let response = app()
        .oneshot(request("GET", "/mock/demo/pages?page=2&limit=2"))
        .await
        .unwrap();
    let body = read_json(response).await;

    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    // count 50 is capped by list_cap 5
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["totalPages"], 3);
}

#[tokio::test]
async fn auth_required_endpoint() {
    let response = app().oneshot(request("GET", "/mock/demo/private")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["error"], "unauthorized");

    let authed = Request::builder()
        .method("GET")
        .uri("/mock/demo/private")
        .header("x-api-key", "s3cret")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(authed).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn delete_returns_no_body() {
    let response = app()
        .oneshot(request("DELETE", "/mock/demo/items/9"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn error_responses_are_structured() {
    let response = app().oneshot(request("GET", "/mock/ghost/items")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["error"], "invalid_project_reference");

    let response = app().oneshot(request("PUT", "/mock/demo/items")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["error"], "no_matching_endpoint");
    assert!(body["message"].as_str().unwrap().contains("PUT /items"));

    let response = app().oneshot(request("GET", "/mock/demo/bad")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await["error"], "misconfigured_status_code");
}

#[tokio::test]
async fn malformed_path_gets_json_error() {
    let response = app()
        .oneshot(request("GET", "/mock/demo/items/%FF"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));

    let body = read_json(response).await;
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].as_str().unwrap().contains("UTF-8"));
}

#[tokio::test]
async fn project_root_path() {
    let response = app().oneshot(request("GET", "/mock/demo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("GET /"));
}

#[tokio::test]
async fn health_reports_counters() {
    let app = app();
    let _ = app.clone().oneshot(request("GET", "/mock/demo/items")).await.unwrap();

    let response = app.oneshot(request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
    assert_eq!(body["projects"], 1);
    assert_eq!(body["stats"]["requests_total"], 1);
    assert_eq!(body["stats"]["generations"], 1);
}
