use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;

use obsgate_common::api::tools::{ToolCallRequest, ToolListResponse};
use obsgate_common::ToolError;

use crate::tools::ToolRegistry;

/// Shared application state.
pub struct AppState {
    pub registry: ToolRegistry,
    /// None when no recorder is installed (tests).
    pub metrics_handle: Option<PrometheusHandle>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/tools", get(list_tools_handler))
        .route("/tools/call", post(call_tool_handler))
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "healthy" })),
    )
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// GET /tools: registered tool names.
async fn list_tools_handler(State(state): State<Arc<AppState>>) -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: state.registry.tool_names(),
    })
}

/// POST /tools/call: run one governed tool call.
///
/// Tool failures come back as a 200 with `isError: true` so the agent can read
/// the message. Only an unknown tool is a 404.
pub async fn call_tool_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ToolCallRequest>,
) -> impl IntoResponse {
    let result = state
        .registry
        .execute(&request.name, request.arguments)
        .await;

    let status = match result.error {
        Some(ToolError::UnknownTool(_)) => StatusCode::NOT_FOUND,
        _ => StatusCode::OK,
    };

    (status, Json(result.response))
}
