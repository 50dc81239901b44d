pub mod adapter;
pub mod guard;
pub mod handlers;
pub mod registry;
pub mod tokens;
pub mod truncation;

pub use adapter::{adapt, guard_handler, IntoToolHandler, IntoToolResponse};
pub use guard::{default_max_tokens, GuardOptions, ResponseGuard, ResponseModifier};
pub use registry::{ToolContext, ToolExecutionResult, ToolHandler, ToolRegistry};
pub use truncation::LogTruncationModifier;
