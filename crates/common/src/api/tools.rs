use serde::{Deserialize, Serialize};
use serde_json::Value;

/// POST /tools/call request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// GET /tools response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolListResponse {
    pub tools: Vec<String>,
}
