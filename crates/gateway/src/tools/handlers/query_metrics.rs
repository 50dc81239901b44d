use std::sync::Arc;

use serde::Deserialize;

use obsgate_common::ToolError;
use obsgate_common::api::backend::MetricQueryRequest;
use obsgate_common::types::{TimeRange, ToolResponse};

use crate::tools::registry::ToolContext;

#[derive(Deserialize)]
pub struct Args {
    expr: String,
    #[serde(default)]
    since: Option<String>,
    #[serde(default)]
    until: Option<String>,
    #[serde(default)]
    step_seconds: Option<u64>,
}

pub async fn handler(
    ctx: Arc<ToolContext>,
    args: Args,
) -> Result<Option<ToolResponse>, ToolError> {
    if args.step_seconds == Some(0) {
        return Err(ToolError::InvalidArguments(
            "step_seconds must be > 0".into(),
        ));
    }

    let range = TimeRange::parse(args.since.as_deref(), args.until.as_deref())
        .map_err(ToolError::InvalidArguments)?;

    let request = MetricQueryRequest {
        expr: args.expr,
        range,
        step_seconds: args.step_seconds,
    };

    let body = ctx
        .backend
        .post_json("/api/metrics/query", &request)
        .await
        .map_err(|e| ToolError::Upstream(format!("Metric query failed: {}", e)))?;

    ToolResponse::json(&body)
        .map(Some)
        .map_err(|e| ToolError::Upstream(format!("Failed to encode metric results: {}", e)))
}
