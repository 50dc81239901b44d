//! End-to-end tests: the gateway's HTTP surface in front of a stub observability backend.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use obsgate_common::config::{BackendConfig, GuardConfig, ToolGuardConfig};
use obsgate_common::types::{LogEntry, ToolResponse};
use obsgate_gateway::routes::{self, AppState};
use obsgate_gateway::tools::handlers::register_observability_tools;
use obsgate_gateway::tools::truncation::{
    MESSAGE_LIMIT, STRICT_ATTRIBUTE_LIMIT, TRUNCATION_SUFFIX,
};
use obsgate_gateway::tools::{ToolContext, ToolRegistry};

const TRACES_TOO_LARGE: &str = "Too many spans. Filter by operation or narrow the time window.";

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn stub_backend() -> SocketAddr {
    let app = Router::new()
        .route(
            "/api/logs/search",
            post(|Json(request): Json<Value>| async move {
                assert_eq!(request["query"], "payment failed");
                let entries: Vec<Value> = (0..10)
                    .map(|i| {
                        json!({
                            "timestamp": format!("2026-05-01T10:00:{:02}Z", i),
                            "message": "m".repeat(5000),
                            "logAttributes": {
                                "stacktrace": "s".repeat(2000),
                                "user.id": "u-42",
                            },
                            "resourceAttributes": {"service.name": "payments"},
                        })
                    })
                    .collect();
                Json(Value::Array(entries))
            }),
        )
        .route(
            "/api/traces/search",
            post(|| async { Json(json!({"spans": "x".repeat(50_000)})) }),
        )
        .route(
            "/api/metrics/query",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "parse error in expr"})),
                )
            }),
        )
        .route(
            "/api/services",
            get(|| async { Json(json!(["payments", "checkout"])) }),
        );
    serve(app).await
}

async fn gateway(backend: SocketAddr) -> SocketAddr {
    let mut guards = GuardConfig::default();
    guards.tools.insert(
        "search_logs".into(),
        ToolGuardConfig {
            max_tokens: Some(8000),
            ..Default::default()
        },
    );
    guards.tools.insert(
        "search_traces".into(),
        ToolGuardConfig {
            max_tokens: Some(2000),
            too_large_message: Some(TRACES_TOO_LARGE.into()),
            modifier: None,
        },
    );

    let context = ToolContext::new(&BackendConfig {
        base_url: format!("http://{}", backend),
        timeout_seconds: 5,
    })
    .unwrap();
    let mut registry = ToolRegistry::new(context);
    register_observability_tools(&mut registry, &guards).unwrap();

    let state = Arc::new(AppState {
        registry,
        metrics_handle: None,
    });
    serve(routes::router(state)).await
}

async fn call(gateway: SocketAddr, name: &str, arguments: Value) -> (StatusCode, ToolResponse) {
    let response = reqwest::Client::new()
        .post(format!("http://{}/tools/call", gateway))
        .json(&json!({"name": name, "arguments": arguments}))
        .send()
        .await
        .unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_oversized_logs_are_truncated_then_released() {
    let gw = gateway(stub_backend().await).await;

    let (status, response) = call(gw, "search_logs", json!({"query": "payment failed"})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!response.is_error, "{}", response.joined_text());

    let entries: Vec<LogEntry> = serde_json::from_str(&response.joined_text()).unwrap();
    assert_eq!(entries.len(), 10);
    for entry in &entries {
        let message = entry.message.as_deref().unwrap();
        assert_eq!(message.chars().count(), MESSAGE_LIMIT);
        assert!(message.ends_with(TRUNCATION_SUFFIX));
        assert_eq!(
            entry.log_attributes["stacktrace"].chars().count(),
            STRICT_ATTRIBUTE_LIMIT
        );
        assert_eq!(entry.log_attributes["user.id"], "u-42");
        assert_eq!(entry.resource_attributes["service.name"], "payments");
        assert!(entry.extra.contains_key("timestamp"));
    }
}

#[tokio::test]
async fn test_oversized_traces_are_rejected_whole() {
    let gw = gateway(stub_backend().await).await;

    let (status, response) = call(gw, "search_traces", json!({"service": "payments"})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(response.is_error);
    assert_eq!(response.joined_text(), TRACES_TOO_LARGE);
}

#[tokio::test]
async fn test_upstream_errors_are_passed_through() {
    let gw = gateway(stub_backend().await).await;

    let (_, response) = call(gw, "query_metrics", json!({"expr": "rate(("})).await;
    assert!(response.is_error);
    assert_eq!(
        response.joined_text(),
        "Metric query failed: Backend returned 400: parse error in expr"
    );
}

#[tokio::test]
async fn test_missing_k8s_kind_is_empty_success() {
    let gw = gateway(stub_backend().await).await;

    let (status, response) = call(gw, "list_k8s_resources", json!({"kind": "pods"})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!response.is_error);
    assert!(response.is_empty());
}

#[tokio::test]
async fn test_small_responses_pass_untouched() {
    let gw = gateway(stub_backend().await).await;

    let (_, response) = call(gw, "list_services", Value::Null).await;
    assert!(!response.is_error);
    assert_eq!(response.joined_text(), r#"["payments","checkout"]"#);
}

#[tokio::test]
async fn test_unknown_tool_is_not_found() {
    let gw = gateway(stub_backend().await).await;

    let (status, response) = call(gw, "drop_tables", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(response.is_error);
}

#[tokio::test]
async fn test_tool_listing() {
    let gw = gateway(stub_backend().await).await;

    let body: Value = reqwest::get(format!("http://{}/tools", gw))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let tools: Vec<&str> = body["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(tools.contains(&"search_logs"));
    assert!(tools.contains(&"get_response_limits"));
}
