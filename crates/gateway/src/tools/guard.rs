use std::sync::{Arc, LazyLock, OnceLock};

use obsgate_common::config::ToolGuardConfig;
use obsgate_common::types::ToolResponse;
use obsgate_common::ToolError;

use super::tokens::estimate_response_tokens;
use super::truncation::LogTruncationModifier;

/// Environment variable overriding the process-wide default token budget.
pub const MAX_TOKENS_ENV: &str = "OBSGATE_MAX_RESPONSE_TOKENS";

/// Budget used when the environment does not provide a usable value.
pub const FALLBACK_MAX_TOKENS: usize = 12_000;

/// Message returned when a response exceeds its budget and the tool has none configured.
pub const DEFAULT_TOO_LARGE_MESSAGE: &str = "Response too large for the context window. \
    Filter more, narrow the time window, or use a different tool.";

/// Modifier names accepted in gateway.toml.
pub const MODIFIER_LOG_TRUNCATION: &str = "log_truncation";
pub const MODIFIER_NONE: &str = "none";

static DEFAULT_MAX_TOKENS: OnceLock<usize> = OnceLock::new();

static DEFAULT_GUARD: LazyLock<Arc<ResponseGuard>> =
    LazyLock::new(|| Arc::new(ResponseGuard::default()));

/// Parse a raw budget value. Missing, non-numeric and non-positive values fall back.
pub fn parse_max_tokens(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(FALLBACK_MAX_TOKENS)
}

/// Process-wide default budget, read from the environment exactly once.
pub fn default_max_tokens() -> usize {
    *DEFAULT_MAX_TOKENS.get_or_init(|| {
        let raw = std::env::var(MAX_TOKENS_ENV).ok();
        let resolved = parse_max_tokens(raw.as_deref());
        tracing::info!(
            env = MAX_TOKENS_ENV,
            raw = raw.as_deref().unwrap_or(""),
            max_tokens = resolved,
            "Resolved default response token budget"
        );
        resolved
    })
}

/// The guard applied to tools registered without one.
pub fn default_guard() -> Arc<ResponseGuard> {
    Arc::clone(&DEFAULT_GUARD)
}

/// Per-tool budget settings. Fixed at registration, never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuardOptions {
    pub max_tokens: Option<i64>,
    pub too_large_message: Option<String>,
}

impl GuardOptions {
    pub fn with_max_tokens(mut self, max_tokens: i64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_too_large_message(mut self, message: impl Into<String>) -> Self {
        self.too_large_message = Some(message.into());
        self
    }

    /// The configured budget if positive, the process-wide default otherwise.
    pub fn effective_max_tokens(&self) -> usize {
        self.max_tokens
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_else(default_max_tokens)
    }

    pub fn too_large_message(&self) -> &str {
        self.too_large_message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_TOO_LARGE_MESSAGE)
    }
}

impl From<&ToolGuardConfig> for GuardOptions {
    fn from(config: &ToolGuardConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            too_large_message: config.too_large_message.clone(),
        }
    }
}

/// A tool-specific rewrite step run before size estimation.
///
/// Rewrites in place and reports whether anything changed. An error aborts the
/// call before the response is measured.
pub trait ResponseModifier: Send + Sync {
    fn modify(&self, tool_name: &str, response: &mut ToolResponse) -> Result<bool, String>;
}

impl<F> ResponseModifier for F
where
    F: Fn(&str, &mut ToolResponse) -> Result<bool, String> + Send + Sync,
{
    fn modify(&self, tool_name: &str, response: &mut ToolResponse) -> Result<bool, String> {
        self(tool_name, response)
    }
}

/// Resolve a modifier by its configuration name.
pub fn modifier_by_name(name: &str) -> Result<Option<Arc<dyn ResponseModifier>>, String> {
    match name {
        MODIFIER_LOG_TRUNCATION => Ok(Some(Arc::new(LogTruncationModifier))),
        MODIFIER_NONE => Ok(None),
        other => Err(format!("Unknown response modifier: '{}'", other)),
    }
}

/// Decides whether a response may be released to the consumer.
#[derive(Clone, Default)]
pub struct ResponseGuard {
    options: GuardOptions,
    modifier: Option<Arc<dyn ResponseModifier>>,
}

impl ResponseGuard {
    pub fn new(options: GuardOptions) -> Self {
        Self {
            options,
            modifier: None,
        }
    }

    pub fn with_modifier(mut self, modifier: Arc<dyn ResponseModifier>) -> Self {
        self.modifier = Some(modifier);
        self
    }

    /// Build a guard from a tool's configuration section.
    ///
    /// `default_modifier` applies when the section does not name one.
    pub fn from_config(
        config: Option<&ToolGuardConfig>,
        default_modifier: Option<&str>,
    ) -> Result<Self, String> {
        let options = config.map(GuardOptions::from).unwrap_or_default();
        let modifier_name = config
            .and_then(|c| c.modifier.as_deref())
            .or(default_modifier)
            .unwrap_or(MODIFIER_NONE);

        let mut guard = Self::new(options);
        guard.modifier = modifier_by_name(modifier_name)?;
        Ok(guard)
    }

    pub fn options(&self) -> &GuardOptions {
        &self.options
    }

    pub fn has_modifier(&self) -> bool {
        self.modifier.is_some()
    }

    /// Modify, estimate, enforce.
    ///
    /// Rejection is total: an oversized response is never clipped and returned.
    pub fn apply(
        &self,
        tool_name: &str,
        mut response: ToolResponse,
    ) -> Result<ToolResponse, ToolError> {
        if let Some(modifier) = &self.modifier {
            let changed =
                modifier
                    .modify(tool_name, &mut response)
                    .map_err(|message| ToolError::Modifier {
                        tool: tool_name.to_string(),
                        message,
                    })?;
            if changed {
                tracing::debug!(tool = %tool_name, "Response rewritten by modifier");
                metrics::counter!("tools.guard.modified", "tool" => tool_name.to_string())
                    .increment(1);
            }
        }

        let estimated = estimate_response_tokens(&response)?;
        let max = self.options.effective_max_tokens();
        metrics::histogram!("tools.guard.estimated_tokens", "tool" => tool_name.to_string())
            .record(estimated as f64);

        if estimated > max {
            tracing::warn!(
                tool = %tool_name,
                estimated_tokens = estimated,
                max_tokens = max,
                "Response rejected: over token budget"
            );
            metrics::counter!("tools.guard.rejected", "tool" => tool_name.to_string())
                .increment(1);
            return Err(ToolError::ResponseTooLarge {
                message: self.options.too_large_message().to_string(),
                estimated,
                max,
            });
        }

        Ok(response)
    }
}
