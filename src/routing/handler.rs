//! Request handlers and parameter loaders.

use std::fmt;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture};

use crate::routing::context::RequestContext;

/// What a handler tells the dispatcher after it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Run the next handler in the chain, then the next matching layer.
    Next,
    /// The reply is final. Stop dispatching.
    Halt,
    /// Skip the rest of this chain and try the next matching layer.
    NextRoute,
}

/// A request handler in a chain.
pub trait Middleware: Send + Sync {
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Flow>;

    /// Short name used when listing compiled chains.
    fn label(&self) -> &str {
        "handler"
    }
}

pub type Handler = Arc<dyn Middleware>;

impl fmt::Debug for dyn Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Loads a captured path parameter before route handlers run.
pub trait ParamLoader: Send + Sync {
    fn load<'a>(&'a self, ctx: &'a mut RequestContext, value: String) -> BoxFuture<'a, Flow>;
}

pub type ParamHandler = Arc<dyn ParamLoader>;

struct HandlerFn<F>(F);

impl<F> Middleware for HandlerFn<F>
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, Flow> + Send + Sync,
{
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Flow> {
        (self.0)(ctx)
    }
}

/// Wrap an async closure as a [`Handler`].
///
/// ```ignore
/// let h = handler_fn(|ctx| Box::pin(async move {
///     ctx.send(StatusCode::OK, "hello");
///     Flow::Halt
/// }));
/// ```
pub fn handler_fn<F>(f: F) -> Handler
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, Flow> + Send + Sync + 'static,
{
    Arc::new(HandlerFn(f))
}

struct SyncFn<F> {
    label: &'static str,
    f: F,
}

impl<F> Middleware for SyncFn<F>
where
    F: Fn(&mut RequestContext) -> Flow + Send + Sync,
{
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Flow> {
        Box::pin(future::ready((self.f)(ctx)))
    }

    fn label(&self) -> &str {
        self.label
    }
}

/// Wrap a synchronous closure as a [`Handler`].
pub fn sync_handler<F>(f: F) -> Handler
where
    F: Fn(&mut RequestContext) -> Flow + Send + Sync + 'static,
{
    labeled_handler("handler", f)
}

/// Like [`sync_handler`], reporting `label` when the chain is listed.
pub fn labeled_handler<F>(label: &'static str, f: F) -> Handler
where
    F: Fn(&mut RequestContext) -> Flow + Send + Sync + 'static,
{
    Arc::new(SyncFn { label, f })
}

struct ParamFn<F>(F);

impl<F> ParamLoader for ParamFn<F>
where
    F: for<'a> Fn(&'a mut RequestContext, String) -> BoxFuture<'a, Flow> + Send + Sync,
{
    fn load<'a>(&'a self, ctx: &'a mut RequestContext, value: String) -> BoxFuture<'a, Flow> {
        (self.0)(ctx, value)
    }
}

/// Wrap an async closure as a [`ParamHandler`].
pub fn param_fn<F>(f: F) -> ParamHandler
where
    F: for<'a> Fn(&'a mut RequestContext, String) -> BoxFuture<'a, Flow> + Send + Sync + 'static,
{
    Arc::new(ParamFn(f))
}

struct SyncParam<F>(F);

impl<F> ParamLoader for SyncParam<F>
where
    F: Fn(&mut RequestContext, String) -> Flow + Send + Sync,
{
    fn load<'a>(&'a self, ctx: &'a mut RequestContext, value: String) -> BoxFuture<'a, Flow> {
        Box::pin(future::ready((self.0)(ctx, value)))
    }
}

/// Wrap a synchronous closure as a [`ParamHandler`].
pub fn sync_param<F>(f: F) -> ParamHandler
where
    F: Fn(&mut RequestContext, String) -> Flow + Send + Sync + 'static,
{
    Arc::new(SyncParam(f))
}

/// Run `chain` in order until a handler stops it.
pub async fn run_chain(chain: &[Handler], ctx: &mut RequestContext) -> Flow {
    for handler in chain {
        match handler.handle(ctx).await {
            Flow::Next => continue,
            stop => return stop,
        }
    }
    Flow::Next
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_chain_stops_on_halt() {
        let chain = vec![
            sync_handler(|ctx| {
                ctx.set_property("first", true);
                Flow::Next
            }),
            handler_fn(|ctx| {
                Box::pin(async move {
                    ctx.send(StatusCode::OK, "done");
                    Flow::Halt
                })
            }),
            sync_handler(|ctx| {
                ctx.set_property("unreachable", true);
                Flow::Next
            }),
        ];

        let mut ctx = RequestContext::new(Method::GET, "/");
        assert_eq!(run_chain(&chain, &mut ctx).await, Flow::Halt);
        assert!(ctx.property("first").is_some());
        assert!(ctx.property("unreachable").is_none());
        assert_eq!(ctx.reply().unwrap().text(), "done");
    }

    #[tokio::test]
    async fn test_empty_chain_continues() {
        let mut ctx = RequestContext::new(Method::GET, "/");
        assert_eq!(run_chain(&[], &mut ctx).await, Flow::Next);
    }

    #[test]
    fn test_labels() {
        assert_eq!(sync_handler(|_| Flow::Next).label(), "handler");
        assert_eq!(labeled_handler("view", |_| Flow::Next).label(), "view");
    }

    #[test]
    fn test_chain_debug_lists_labels() {
        let chain = vec![labeled_handler("validate", |_| Flow::Next), sync_handler(|_| Flow::Next)];
        assert_eq!(format!("{chain:?}"), "[validate, handler]");
    }
}
