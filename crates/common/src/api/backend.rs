use serde::{Deserialize, Serialize};

use crate::types::TimeRange;

/// POST /api/logs/search request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogSearchRequest {
    pub query: String,
    #[serde(flatten)]
    pub range: TimeRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// POST /api/traces/search request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceSearchRequest {
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(flatten)]
    pub range: TimeRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// POST /api/metrics/query request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricQueryRequest {
    /// Query expression in the backend's native language.
    pub expr: String,
    #[serde(flatten)]
    pub range: TimeRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_seconds: Option<u64>,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BackendErrorBody {
    pub error: String,
}
