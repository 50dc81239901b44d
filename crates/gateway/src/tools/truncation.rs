use std::borrow::Cow;
use std::collections::BTreeMap;

use obsgate_common::types::{Content, LogEntry, LogsPayload, ToolResponse};

use super::guard::ResponseModifier;

/// Appended to every shortened value.
pub const TRUNCATION_SUFFIX: &str = "... [truncated]";

/// Max scalar values kept in a log message.
pub const MESSAGE_LIMIT: usize = 2000;
/// Max scalar values kept in an ordinary attribute value.
pub const ATTRIBUTE_LIMIT: usize = 600;
/// Max scalar values kept for attributes known to carry verbose diagnostics.
pub const STRICT_ATTRIBUTE_LIMIT: usize = 300;

/// Attribute keys (compared trimmed, ASCII case-insensitively) held to the strict limit.
pub const STRICT_ATTRIBUTE_KEYS: [&str; 3] = ["error", "errorverbose", "stacktrace"];

/// Shorten `value` to at most `limit` unicode scalar values.
///
/// Values that already fit are returned borrowed. Longer values keep their first
/// `limit - 15` scalars followed by [`TRUNCATION_SUFFIX`]. When `limit` cannot even
/// hold the suffix, the result is the first `limit` scalars of the suffix itself.
pub fn truncate_chars(value: &str, limit: usize) -> Cow<'_, str> {
    // Byte length bounds scalar count from above.
    if value.len() <= limit || value.chars().count() <= limit {
        return Cow::Borrowed(value);
    }

    let suffix_len = TRUNCATION_SUFFIX.chars().count();
    if limit <= suffix_len {
        return Cow::Owned(TRUNCATION_SUFFIX.chars().take(limit).collect());
    }

    let mut truncated: String = value.chars().take(limit - suffix_len).collect();
    truncated.push_str(TRUNCATION_SUFFIX);
    Cow::Owned(truncated)
}

/// Limit for an attribute value, based on its key.
pub fn attribute_limit(key: &str) -> usize {
    let key = key.trim();
    if STRICT_ATTRIBUTE_KEYS
        .iter()
        .any(|strict| strict.eq_ignore_ascii_case(key))
    {
        STRICT_ATTRIBUTE_LIMIT
    } else {
        ATTRIBUTE_LIMIT
    }
}

fn truncate_field(value: &mut String, limit: usize) -> bool {
    let shortened = match truncate_chars(value, limit) {
        Cow::Borrowed(_) => return false,
        Cow::Owned(s) => s,
    };
    *value = shortened;
    true
}

fn truncate_attributes(attributes: &mut BTreeMap<String, String>) -> bool {
    let mut changed = false;
    for (key, value) in attributes.iter_mut() {
        changed |= truncate_field(value, attribute_limit(key));
    }
    changed
}

/// Truncate the governed fields of one entry. Returns whether anything changed.
pub fn truncate_log_entry(entry: &mut LogEntry) -> bool {
    let mut changed = match entry.message.as_mut() {
        Some(message) => truncate_field(message, MESSAGE_LIMIT),
        None => false,
    };
    changed |= truncate_attributes(&mut entry.log_attributes);
    changed |= truncate_attributes(&mut entry.resource_attributes);
    changed
}

/// Shrinks oversized fields in log search results before size enforcement.
///
/// Safe to run on any tool's output: text that does not parse as a logs payload
/// is left alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTruncationModifier;

impl LogTruncationModifier {
    /// Rewrite one text block. `Ok(None)` means the text was not a logs payload
    /// or nothing needed truncating, in which case the caller keeps the original bytes.
    pub fn truncate_text(&self, text: &str) -> Result<Option<String>, String> {
        let mut payload: LogsPayload = match serde_json::from_str(text) {
            Ok(payload) => payload,
            Err(_) => return Ok(None),
        };

        let mut changed = false;
        for entry in payload.iter_mut() {
            changed |= truncate_log_entry(entry);
        }

        if !changed {
            return Ok(None);
        }

        serde_json::to_string(&payload)
            .map(Some)
            .map_err(|e| format!("Failed to serialize truncated logs: {}", e))
    }
}

impl ResponseModifier for LogTruncationModifier {
    fn modify(&self, _tool_name: &str, response: &mut ToolResponse) -> Result<bool, String> {
        let mut changed = false;
        for block in response.content.iter_mut() {
            if let Content::Text { text } = block {
                if let Some(rewritten) = self.truncate_text(text)? {
                    *text = rewritten;
                    changed = true;
                }
            }
        }
        Ok(changed)
    }
}
