use std::sync::Arc;

use serde::Deserialize;

use obsgate_common::ToolError;
use obsgate_common::api::backend::TraceSearchRequest;
use obsgate_common::types::{TimeRange, ToolResponse};

use crate::tools::registry::ToolContext;

#[derive(Deserialize)]
pub struct Args {
    service: String,
    #[serde(default)]
    operation: Option<String>,
    #[serde(default)]
    since: Option<String>,
    #[serde(default)]
    until: Option<String>,
    #[serde(default)]
    limit: Option<u32>,
}

pub async fn handler(
    ctx: Arc<ToolContext>,
    args: Args,
) -> Result<Option<ToolResponse>, ToolError> {
    let range = TimeRange::parse(args.since.as_deref(), args.until.as_deref())
        .map_err(ToolError::InvalidArguments)?;

    let request = TraceSearchRequest {
        service: args.service,
        operation: args.operation.filter(|op| !op.is_empty()),
        range,
        limit: args.limit,
    };

    let body = ctx
        .backend
        .post_json("/api/traces/search", &request)
        .await
        .map_err(|e| ToolError::Upstream(format!("Trace search failed: {}", e)))?;

    ToolResponse::json(&body)
        .map(Some)
        .map_err(|e| ToolError::Upstream(format!("Failed to encode trace results: {}", e)))
}
