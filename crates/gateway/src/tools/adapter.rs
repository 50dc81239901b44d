//! Adapts handlers of different call shapes into the registry's uniform
//! [`ToolHandler`] and routes their output through a [`ResponseGuard`].
//!
//! Supported shapes, all returning a future of `Result<Option<R>, E>`:
//! - `Fn() -> Fut`
//! - `Fn(Args) -> Fut`
//! - `Fn(Arc<ToolContext>, Args) -> Fut`
//!
//! `Args` is deserialized from the call arguments, `R` converts into a
//! [`ToolResponse`] and `E` converts into a [`ToolError`]. `Ok(None)` means
//! "nothing to report" and skips the guard.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use obsgate_common::types::ToolResponse;
use obsgate_common::ToolError;

use super::guard::{default_guard, ResponseGuard};
use super::registry::{ToolContext, ToolFuture, ToolHandler};

/// Conversion from a handler's success value into a [`ToolResponse`].
pub trait IntoToolResponse {
    fn into_tool_response(self) -> Result<ToolResponse, ToolError>;
}

impl IntoToolResponse for ToolResponse {
    fn into_tool_response(self) -> Result<ToolResponse, ToolError> {
        Ok(self)
    }
}

/// Dynamic handlers hand back raw JSON; it must already have the response shape.
impl IntoToolResponse for Value {
    fn into_tool_response(self) -> Result<ToolResponse, ToolError> {
        serde_json::from_value(self)
            .map_err(|e| ToolError::Internal(format!("unexpected response type: {}", e)))
    }
}

impl IntoToolResponse for String {
    fn into_tool_response(self) -> Result<ToolResponse, ToolError> {
        Ok(ToolResponse::text(self))
    }
}

/// Call-shape markers. Only used to keep the blanket impls apart.
pub struct NoArgs;
pub struct WithArgs<A>(PhantomData<fn() -> A>);
pub struct WithContext<A>(PhantomData<fn() -> A>);

/// A handler that can be erased into a [`ToolHandler`].
pub trait IntoToolHandler<Shape>: Send + Sync + 'static {
    fn into_tool_handler(self) -> ToolHandler;
}

impl<F, Fut, R, E> IntoToolHandler<NoArgs> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<R>, E>> + Send + 'static,
    R: IntoToolResponse,
    E: Into<ToolError>,
{
    fn into_tool_handler(self) -> ToolHandler {
        Arc::new(move |_args: Value, _ctx: Arc<ToolContext>| -> ToolFuture {
            let fut = self();
            Box::pin(async move { settle(fut.await) })
        })
    }
}

impl<F, Fut, A, R, E> IntoToolHandler<WithArgs<A>> for F
where
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<R>, E>> + Send + 'static,
    A: DeserializeOwned,
    R: IntoToolResponse,
    E: Into<ToolError>,
{
    fn into_tool_handler(self) -> ToolHandler {
        Arc::new(move |args: Value, _ctx: Arc<ToolContext>| -> ToolFuture {
            match parse_args::<A>(args) {
                Ok(args) => {
                    let fut = self(args);
                    Box::pin(async move { settle(fut.await) })
                }
                Err(e) => Box::pin(std::future::ready(Err(e))),
            }
        })
    }
}

impl<F, Fut, A, R, E> IntoToolHandler<WithContext<A>> for F
where
    F: Fn(Arc<ToolContext>, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<R>, E>> + Send + 'static,
    A: DeserializeOwned,
    R: IntoToolResponse,
    E: Into<ToolError>,
{
    fn into_tool_handler(self) -> ToolHandler {
        Arc::new(move |args: Value, ctx: Arc<ToolContext>| -> ToolFuture {
            match parse_args::<A>(args) {
                Ok(args) => {
                    let fut = self(ctx, args);
                    Box::pin(async move { settle(fut.await) })
                }
                Err(e) => Box::pin(std::future::ready(Err(e))),
            }
        })
    }
}

/// Missing arguments are treated as an empty object so all-optional argument structs parse.
fn parse_args<A: DeserializeOwned>(args: Value) -> Result<A, ToolError> {
    let args = if args.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

fn settle<R, E>(result: Result<Option<R>, E>) -> Result<Option<ToolResponse>, ToolError>
where
    R: IntoToolResponse,
    E: Into<ToolError>,
{
    match result {
        Err(e) => Err(e.into()),
        Ok(None) => Ok(None),
        Ok(Some(response)) => response.into_tool_response().map(Some),
    }
}

/// Wrap an already-erased handler so its successful output passes through `guard`.
///
/// Input and output share the [`ToolHandler`] shape. Handler errors and empty
/// results bypass the guard untouched.
pub fn guard_handler(tool_name: &str, inner: ToolHandler, guard: Arc<ResponseGuard>) -> ToolHandler {
    let tool_name: Arc<str> = Arc::from(tool_name);

    Arc::new(move |args: Value, ctx: Arc<ToolContext>| -> ToolFuture {
        let fut = inner(args, ctx);
        let guard = Arc::clone(&guard);
        let tool_name = Arc::clone(&tool_name);

        Box::pin(async move {
            match fut.await? {
                None => Ok(None),
                Some(response) => guard.apply(&tool_name, response).map(Some),
            }
        })
    })
}

/// Erase `handler` and govern it with `guard`, or the process default guard.
pub fn adapt<Shape, H>(tool_name: &str, handler: H, guard: Option<ResponseGuard>) -> ToolHandler
where
    H: IntoToolHandler<Shape>,
{
    let guard = guard.map(Arc::new).unwrap_or_else(default_guard);
    guard_handler(tool_name, handler.into_tool_handler(), guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::guard::GuardOptions;
    use obsgate_common::config::BackendConfig;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn context() -> Arc<ToolContext> {
        Arc::new(ToolContext::new(&BackendConfig::default()).unwrap())
    }

    #[derive(Deserialize)]
    struct EchoArgs {
        text: String,
        #[serde(default)]
        repeat: Option<usize>,
    }

    async fn echo(args: EchoArgs) -> Result<Option<ToolResponse>, String> {
        Ok(Some(ToolResponse::text(
            args.text.repeat(args.repeat.unwrap_or(1)),
        )))
    }

    #[tokio::test]
    async fn test_args_shape_passes_through_guard() {
        let handler = adapt("echo", echo, None);
        let out = handler(json!({"text": "hi", "repeat": 2}), context())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(out.content[0].as_text(), Some("hihi"));
    }

    #[tokio::test]
    async fn test_hard_rejection_returns_no_response() {
        let guard = ResponseGuard::new(
            GuardOptions::default()
                .with_max_tokens(50)
                .with_too_large_message("Too large: narrow the time window."),
        );
        let handler = adapt(
            "big",
            || async { Ok::<_, String>(Some(ToolResponse::text("a".repeat(4000)))) },
            Some(guard),
        );

        let err = handler(Value::Null, context()).await.unwrap_err();
        assert_eq!(err.to_string(), "Too large: narrow the time window.");
    }

    #[tokio::test]
    async fn test_modifier_rescue() {
        let to_small = |_: &str, response: &mut ToolResponse| -> Result<bool, String> {
            *response = ToolResponse::text("small");
            Ok(true)
        };
        let guard = ResponseGuard::new(GuardOptions::default().with_max_tokens(20))
            .with_modifier(Arc::new(to_small));
        let handler = adapt(
            "big",
            || async { Ok::<_, String>(Some(ToolResponse::text("a".repeat(4000)))) },
            Some(guard),
        );

        let out = handler(Value::Null, context()).await.unwrap().unwrap();
        assert_eq!(out.content[0].as_text(), Some("small"));
    }

    #[tokio::test]
    async fn test_upstream_error_bypasses_guard() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&calls);
        let counting = move |_: &str, _: &mut ToolResponse| -> Result<bool, String> {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        };
        let guard = ResponseGuard::new(GuardOptions::default()).with_modifier(Arc::new(counting));
        let handler = adapt(
            "failing",
            || async { Err::<Option<ToolResponse>, _>("backend returned 503".to_string()) },
            Some(guard),
        );

        let err = handler(Value::Null, context()).await.unwrap_err();
        assert_eq!(err, ToolError::Upstream("backend returned 503".into()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_result_is_nothing_to_guard() {
        let guard = ResponseGuard::new(GuardOptions::default().with_max_tokens(1));
        let handler = adapt(
            "quiet",
            || async { Ok::<Option<ToolResponse>, String>(None) },
            Some(guard),
        );
        assert_eq!(handler(Value::Null, context()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_context_shape_receives_context() {
        async fn base_url(ctx: Arc<ToolContext>, _args: Value) -> Result<Option<String>, String> {
            Ok(Some(ctx.backend.base_url().to_string()))
        }

        let handler = adapt("base_url", base_url, None);
        let out = handler(json!({}), context()).await.unwrap().unwrap();
        assert_eq!(
            out.content[0].as_text(),
            Some(BackendConfig::default().base_url.as_str())
        );
    }

    #[tokio::test]
    async fn test_value_with_wrong_shape_is_internal_error() {
        let handler = adapt(
            "dynamic",
            || async { Ok::<_, String>(Some(json!({"results": [1, 2, 3]}))) },
            None,
        );
        let err = handler(Value::Null, context()).await.unwrap_err();
        assert!(err.is_internal());
        assert!(err.to_string().contains("unexpected response type"));
    }

    #[tokio::test]
    async fn test_value_with_response_shape_is_accepted() {
        let handler = adapt(
            "dynamic",
            || async {
                Ok::<_, String>(Some(json!({"content": [{"type": "text", "text": "ok"}]})))
            },
            None,
        );
        let out = handler(Value::Null, context()).await.unwrap().unwrap();
        assert_eq!(out.content[0].as_text(), Some("ok"));
    }

    #[tokio::test]
    async fn test_bad_arguments_are_reported_before_invocation() {
        let handler = adapt("echo", echo, None);
        let err = handler(json!({"repeat": 3}), context()).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert!(err.to_string().contains("missing field"));
    }

    #[tokio::test]
    async fn test_guard_handler_preserves_shape() {
        let inner: ToolHandler = echo.into_tool_handler();
        let wrapped = guard_handler("echo", inner, default_guard());
        let out = wrapped(json!({"text": "again"}), context())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(out.content[0].as_text(), Some("again"));
    }
}
