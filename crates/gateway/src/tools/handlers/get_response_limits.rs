use serde_json::json;

use obsgate_common::types::ToolResponse;

use crate::tools::guard::default_max_tokens;
use crate::tools::truncation::{
    ATTRIBUTE_LIMIT, MESSAGE_LIMIT, STRICT_ATTRIBUTE_KEYS, STRICT_ATTRIBUTE_LIMIT,
    TRUNCATION_SUFFIX,
};

/// Tells the agent how large a response may get before it is rejected.
pub async fn handler() -> Result<Option<ToolResponse>, String> {
    let limits = json!({
        "default_max_tokens": default_max_tokens(),
        "token_estimate": "ceil(characters / 4)",
        "log_truncation": {
            "message_limit": MESSAGE_LIMIT,
            "attribute_limit": ATTRIBUTE_LIMIT,
            "strict_attribute_limit": STRICT_ATTRIBUTE_LIMIT,
            "strict_attribute_keys": STRICT_ATTRIBUTE_KEYS,
            "suffix": TRUNCATION_SUFFIX,
        },
    });

    ToolResponse::json(&limits)
        .map(Some)
        .map_err(|e| format!("Failed to encode limits: {}", e))
}
