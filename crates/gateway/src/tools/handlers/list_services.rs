use std::sync::Arc;

use serde::Deserialize;

use obsgate_common::types::ToolResponse;

use crate::tools::registry::ToolContext;

/// Takes no arguments.
#[derive(Deserialize)]
pub struct Args {}

pub async fn handler(ctx: Arc<ToolContext>, _args: Args) -> Result<Option<ToolResponse>, String> {
    let body = ctx
        .backend
        .get_json("/api/services", &[])
        .await
        .map_err(|e| format!("Service listing failed: {}", e))?;

    ToolResponse::json(&body)
        .map(Some)
        .map_err(|e| format!("Failed to encode services: {}", e))
}
