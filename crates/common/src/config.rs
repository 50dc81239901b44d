use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Top-level gateway configuration, deserialized from gateway.toml.
///
/// Every section is optional in the file; missing sections fall back to defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub guard: GuardConfig,
}

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8090 }
    }
}

/// The observability API every tool proxies to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL, e.g. "http://localhost:9090". No trailing slash required.
    pub base_url: String,
    /// Per-request timeout applied to every upstream call.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9090".into(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Response governance settings, keyed by tool name.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default)]
    pub tools: HashMap<String, ToolGuardConfig>,
}

/// Guard settings for one tool. Unset fields use the process-wide defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolGuardConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub too_large_message: Option<String>,
    /// Name of the rewrite step to run before size enforcement ("log_truncation" or "none").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,
}
