//! Task-local request context.
//!
//! `TraceSpan` scopes each HTTP request with the [`RequestContext`] built by
//! `RequestTrace`; error rendering reads the trace id back so the problem
//! body and the `x-trace-id` header agree. The hub and the persistence sink
//! run outside any request and see `"unknown"`.

use tokio::task_local;

/// What the middleware knows about a request before routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub trace_id: String,
    /// Session id taken from `/game/{id}` or `/ws/{id}` paths.
    pub session_id: Option<String>,
    pub realtime: bool,
}

impl RequestContext {
    pub fn new(trace_id: impl Into<String>, path: &str) -> Self {
        let mut segments = path.trim_matches('/').split('/').skip_while(|s| *s != "game" && *s != "ws");
        let kind = segments.next();
        let session_id = segments
            .next()
            .filter(|id| !id.is_empty() && *id != "save" && *id != "distribute")
            .map(str::to_string);
        Self {
            trace_id: trace_id.into(),
            session_id,
            realtime: kind == Some("ws"),
        }
    }
}

task_local! {
    static CONTEXT: RequestContext;
}

/// Trace id for the current task, or `"unknown"` outside a request scope.
pub fn trace_id() -> String {
    CONTEXT
        .try_with(|ctx| ctx.trace_id.clone())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Session addressed by the current request, if any.
pub fn session_id() -> Option<String> {
    CONTEXT.try_with(|ctx| ctx.session_id.clone()).ok().flatten()
}

/// Run a future within a request context.
pub async fn scope<F, R>(ctx: RequestContext, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    CONTEXT.scope(ctx, future).await
}
