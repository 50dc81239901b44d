use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One unit of a tool response, tagged by kind.
///
/// Only `Text` is interpreted by response governance; the other kinds pass
/// through untouched but still count toward the serialized size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text {
        text: String,
    },
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    Resource {
        resource: Value,
    },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// The text of a `Text` block, `None` for every other kind.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// A tool call result as released to the consumer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<Content>,
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResponse {
    pub fn new(content: Vec<Content>) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    /// A single text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![Content::text(text)])
    }

    /// A single text block serialized from a JSON value.
    pub fn json(value: &Value) -> serde_json::Result<Self> {
        Ok(Self::text(serde_json::to_string(value)?))
    }

    /// An error result carrying `message` as its only text block.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(message)],
            is_error: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// The content blocks exactly as they go out on the wire.
    pub fn wire_content(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.content)
    }

    /// Concatenated text of every text block, mainly for logging and tests.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(Content::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
