use thiserror::Error;

/// Errors surfaced by a governed tool call.
///
/// Every variant is returned alongside "no response"; a caller never gets
/// partial content together with an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    // --- Upstream (the wrapped handler itself failed) ---
    #[error("{0}")]
    Upstream(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    // --- Governance ---
    #[error("Modifier failed for tool '{tool}': {message}")]
    Modifier { tool: String, message: String },

    /// Displays only the actionable message so it can be shown to the agent verbatim.
    #[error("{message}")]
    ResponseTooLarge {
        message: String,
        estimated: usize,
        max: usize,
    },

    // --- Registration bugs (never per-request conditions) ---
    #[error("Internal tool adapter error: {0}")]
    Internal(String),

    #[error("Unknown tool: '{0}'")]
    UnknownTool(String),
}

impl ToolError {
    /// Whether the caller can reasonably retry with a narrower query.
    pub fn is_retryable_with_narrower_query(&self) -> bool {
        matches!(self, Self::ResponseTooLarge { .. })
    }

    /// Whether this error points at a registration bug rather than the request.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_) | Self::UnknownTool(_))
    }

    /// Whether the error was raised by the wrapped handler or its arguments.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::InvalidArguments(_))
    }
}

/// Handlers report failures as plain strings; those are upstream errors.
impl From<String> for ToolError {
    fn from(message: String) -> Self {
        Self::Upstream(message)
    }
}

impl From<&str> for ToolError {
    fn from(message: &str) -> Self {
        Self::Upstream(message.to_string())
    }
}

/// Result type alias for governed tool calls.
pub type Result<T> = std::result::Result<T, ToolError>;
