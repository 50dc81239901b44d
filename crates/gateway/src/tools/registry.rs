use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use obsgate_common::config::BackendConfig;
use obsgate_common::types::ToolResponse;
use obsgate_common::{CallId, ToolError};

use super::adapter::{adapt, IntoToolHandler};
use super::guard::ResponseGuard;
use crate::backend::{BackendClient, BackendError};

/// Shared context available to all tool handlers.
pub struct ToolContext {
    pub backend: BackendClient,
}

impl ToolContext {
    pub fn new(backend: &BackendConfig) -> Result<Self, BackendError> {
        Ok(Self {
            backend: BackendClient::new(backend)?,
        })
    }
}

/// Future returned by every erased handler.
pub type ToolFuture = Pin<Box<dyn Future<Output = Result<Option<ToolResponse>, ToolError>> + Send>>;

/// Uniform handler signature. `Ok(None)` means the tool had nothing to report.
pub type ToolHandler = Arc<dyn Fn(Value, Arc<ToolContext>) -> ToolFuture + Send + Sync>;

/// Result from executing a single tool call.
#[derive(Debug)]
pub struct ToolExecutionResult {
    /// What goes back to the consumer: the governed response, or an error response.
    pub response: ToolResponse,
    pub error: Option<ToolError>,
}

impl ToolExecutionResult {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Malformed calls are the caller's fault and worth correcting, not retrying.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self.error,
            Some(ToolError::InvalidArguments(_) | ToolError::UnknownTool(_))
        )
    }
}

/// Registry of governed tool handlers.
pub struct ToolRegistry {
    handlers: HashMap<String, ToolHandler>,
    context: Arc<ToolContext>,
}

impl ToolRegistry {
    pub fn new(context: ToolContext) -> Self {
        Self {
            handlers: HashMap::new(),
            context: Arc::new(context),
        }
    }

    /// Register a tool governed by the process default guard.
    pub fn register<Shape, H>(&mut self, name: &str, handler: H)
    where
        H: IntoToolHandler<Shape>,
    {
        self.handlers
            .insert(name.to_string(), adapt(name, handler, None));
    }

    /// Register a tool with its own guard.
    pub fn register_guarded<Shape, H>(&mut self, name: &str, handler: H, guard: ResponseGuard)
    where
        H: IntoToolHandler<Shape>,
    {
        tracing::debug!(
            tool = name,
            max_tokens = ?guard.options().max_tokens,
            modifier = guard.has_modifier(),
            "Registering guarded tool"
        );
        self.handlers
            .insert(name.to_string(), adapt(name, handler, Some(guard)));
    }

    /// Registered tool names, sorted.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Run a tool and return its governed result.
    pub async fn call(&self, tool_name: &str, args: Value) -> Result<Option<ToolResponse>, ToolError> {
        let handler = self
            .handlers
            .get(tool_name)
            .ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;
        handler(args, Arc::clone(&self.context)).await
    }

    /// Execute a tool call by name, with logging and metrics, producing a wire-ready result.
    pub async fn execute(&self, tool_name: &str, args: Value) -> ToolExecutionResult {
        let call_id = CallId::new();
        let start = std::time::Instant::now();

        tracing::info!(tool = %tool_name, call_id = %call_id, "Tool call started");

        let result = self.call(tool_name, args).await;

        let latency = start.elapsed().as_secs_f64();
        metrics::histogram!("tools.execution.latency", "tool" => tool_name.to_string())
            .record(latency);
        metrics::counter!("tools.execution.count", "tool" => tool_name.to_string()).increment(1);

        match result {
            Ok(response) => {
                let response = response.unwrap_or_default();
                tracing::info!(
                    tool = %tool_name,
                    call_id = %call_id,
                    latency_s = latency,
                    result_len = response.content.len(),
                    "Tool call succeeded"
                );
                ToolExecutionResult {
                    response,
                    error: None,
                }
            }
            Err(err) => {
                tracing::warn!(
                    tool = %tool_name,
                    call_id = %call_id,
                    latency_s = latency,
                    error = %err,
                    "Tool call failed"
                );
                metrics::counter!("tools.execution.errors", "tool" => tool_name.to_string())
                    .increment(1);
                ToolExecutionResult {
                    response: ToolResponse::error(err.to_string()),
                    error: Some(err),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::guard::GuardOptions;
    use serde_json::json;

    fn registry() -> ToolRegistry {
        ToolRegistry::new(ToolContext::new(&BackendConfig::default()).unwrap())
    }

    async fn ping() -> Result<Option<ToolResponse>, String> {
        Ok(Some(ToolResponse::text("pong")))
    }

    async fn nothing() -> Result<Option<ToolResponse>, String> {
        Ok(None)
    }

    async fn flood() -> Result<Option<String>, String> {
        Ok(Some("z".repeat(10_000)))
    }

    #[tokio::test]
    async fn test_execute_success() {
        let mut registry = registry();
        registry.register("ping", ping);

        let result = registry.execute("ping", Value::Null).await;
        assert!(!result.is_error());
        assert_eq!(result.response.content[0].as_text(), Some("pong"));
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let registry = registry();
        let result = registry.execute("nope", json!({})).await;
        assert!(result.is_error());
        assert!(result.is_malformed());
        assert!(result.response.is_error);
        assert_eq!(result.response.joined_text(), "Unknown tool: 'nope'");
    }

    #[tokio::test]
    async fn test_execute_rejection_becomes_error_response() {
        let mut registry = registry();
        registry.register_guarded(
            "flood",
            flood,
            ResponseGuard::new(
                GuardOptions::default()
                    .with_max_tokens(100)
                    .with_too_large_message("Use a narrower filter."),
            ),
        );

        let result = registry.execute("flood", Value::Null).await;
        assert!(result.is_error());
        assert!(!result.is_malformed());
        assert_eq!(result.response.joined_text(), "Use a narrower filter.");
        assert!(matches!(
            result.error,
            Some(ToolError::ResponseTooLarge { max: 100, .. })
        ));
    }

    #[tokio::test]
    async fn test_execute_empty_result_is_empty_success() {
        let mut registry = registry();
        registry.register("nothing", nothing);

        let result = registry.execute("nothing", Value::Null).await;
        assert!(!result.is_error());
        assert!(result.response.is_empty());
    }

    #[test]
    fn test_tool_names_sorted() {
        let mut registry = registry();
        registry.register("ping", ping);
        registry.register("flood", flood);
        assert_eq!(registry.tool_names(), vec!["flood", "ping"]);
        assert!(registry.contains("ping"));
    }
}
