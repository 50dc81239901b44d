mod get_response_limits;
mod list_k8s_resources;
mod list_services;
mod query_metrics;
mod search_logs;
mod search_traces;

use obsgate_common::config::GuardConfig;

use super::guard::{ResponseGuard, MODIFIER_LOG_TRUNCATION};
use super::registry::ToolRegistry;

/// Register all observability tools, each governed by its configured guard.
///
/// Log tools get the log truncation modifier unless their section overrides it.
pub fn register_observability_tools(
    registry: &mut ToolRegistry,
    guards: &GuardConfig,
) -> Result<(), String> {
    let guard = |name: &str, default_modifier: Option<&str>| {
        ResponseGuard::from_config(guards.tools.get(name), default_modifier)
            .map_err(|e| format!("Guard for tool '{}': {}", name, e))
    };

    // Log tools.
    registry.register_guarded(
        "search_logs",
        search_logs::handler,
        guard("search_logs", Some(MODIFIER_LOG_TRUNCATION))?,
    );

    // Traces and metrics.
    registry.register_guarded(
        "search_traces",
        search_traces::handler,
        guard("search_traces", None)?,
    );
    registry.register_guarded(
        "query_metrics",
        query_metrics::handler,
        guard("query_metrics", None)?,
    );

    // Kubernetes and service inventory.
    registry.register_guarded(
        "list_k8s_resources",
        list_k8s_resources::handler,
        guard("list_k8s_resources", None)?,
    );
    registry.register_guarded(
        "list_services",
        list_services::handler,
        guard("list_services", None)?,
    );

    // Gateway introspection; tiny, so the default guard is enough.
    registry.register("get_response_limits", get_response_limits::handler);

    tracing::info!(
        tools = registry.tool_names().len(),
        "Registered observability tools"
    );

    Ok(())
}
