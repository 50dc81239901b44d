use std::sync::Arc;

use serde::Deserialize;

use obsgate_common::ToolError;
use obsgate_common::types::ToolResponse;

use crate::tools::registry::ToolContext;

const KNOWN_KINDS: &[&str] = &[
    "pods",
    "deployments",
    "statefulsets",
    "daemonsets",
    "services",
    "nodes",
    "events",
];

#[derive(Deserialize)]
pub struct Args {
    kind: String,
    #[serde(default)]
    namespace: Option<String>,
}

/// List Kubernetes objects of one kind. A 404 from the backend means the
/// cluster has nothing of that kind, which is not an error.
pub async fn handler(
    ctx: Arc<ToolContext>,
    args: Args,
) -> Result<Option<ToolResponse>, ToolError> {
    let kind = args.kind.to_lowercase();
    if !KNOWN_KINDS.contains(&kind.as_str()) {
        return Err(ToolError::InvalidArguments(format!(
            "unknown kind '{}'. Expected one of: {}",
            args.kind,
            KNOWN_KINDS.join(", ")
        )));
    }

    let mut query = Vec::new();
    if let Some(namespace) = args.namespace.as_deref() {
        query.push(("namespace", namespace));
    }

    let path = format!("/api/k8s/{}", kind);
    let body = match ctx.backend.get_json(&path, &query).await {
        Ok(body) => body,
        Err(e) if e.is_not_found() => {
            tracing::debug!(kind = %kind, "No Kubernetes resources found");
            return Ok(None);
        }
        Err(e) => {
            return Err(ToolError::Upstream(format!(
                "Kubernetes listing failed: {}",
                e
            )))
        }
    };

    ToolResponse::json(&body)
        .map(Some)
        .map_err(|e| {
            ToolError::Upstream(format!("Failed to encode Kubernetes resources: {}", e))
        })
}
