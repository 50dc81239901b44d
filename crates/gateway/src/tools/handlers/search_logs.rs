use std::sync::Arc;

use serde::Deserialize;

use obsgate_common::ToolError;
use obsgate_common::api::backend::LogSearchRequest;
use obsgate_common::types::{TimeRange, ToolResponse};

use crate::tools::registry::ToolContext;

const DEFAULT_LIMIT: u32 = 100;

#[derive(Deserialize)]
pub struct Args {
    query: String,
    #[serde(default)]
    since: Option<String>,
    #[serde(default)]
    until: Option<String>,
    #[serde(default)]
    limit: Option<u32>,
}

/// Full-text log search. The backend returns a JSON array of log entries.
pub async fn handler(
    ctx: Arc<ToolContext>,
    args: Args,
) -> Result<Option<ToolResponse>, ToolError> {
    if args.query.trim().is_empty() {
        return Err(ToolError::InvalidArguments(
            "query must not be empty".into(),
        ));
    }

    let range = TimeRange::parse(args.since.as_deref(), args.until.as_deref())
        .map_err(ToolError::InvalidArguments)?;

    let request = LogSearchRequest {
        query: args.query,
        range,
        limit: Some(args.limit.unwrap_or(DEFAULT_LIMIT)),
    };

    let body = ctx
        .backend
        .post_json("/api/logs/search", &request)
        .await
        .map_err(|e| ToolError::Upstream(format!("Log search failed: {}", e)))?;

    ToolResponse::json(&body)
        .map(Some)
        .map_err(|e| ToolError::Upstream(format!("Failed to encode log results: {}", e)))
}
