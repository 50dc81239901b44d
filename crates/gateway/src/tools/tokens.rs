use obsgate_common::types::ToolResponse;
use obsgate_common::ToolError;

/// Approximate token count: one token per four unicode scalar values, rounded up.
///
/// Not tied to any real tokenizer. Stable, cheap and monotonic in the input length.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Estimate the size of a response as it goes out on the wire.
///
/// A response with no content blocks is always zero.
pub fn estimate_response_tokens(response: &ToolResponse) -> Result<usize, ToolError> {
    if response.is_empty() {
        return Ok(0);
    }

    let wire = response
        .wire_content()
        .map_err(|e| ToolError::Internal(format!("Failed to serialize response: {}", e)))?;
    Ok(estimate_tokens(&wire))
}
