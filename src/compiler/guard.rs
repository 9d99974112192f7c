//! Validate → sanitize → execute chain assembly.

use std::sync::Arc;

use axum::http::StatusCode;
use futures_util::future::BoxFuture;

use crate::compiler::error::{CompileError, CompileResult};
use crate::controller::{GateFailure, GateRef, Guarded};
use crate::routing::{Flow, Handler, Middleware, RequestContext, Verb};

/// A gate placed in a chain.
///
/// On failure the error reply is written and dispatch moves on to the next
/// registered route, which may still answer the request.
struct GateStage {
    label: &'static str,
    gate: GateRef,
}

impl Middleware for GateStage {
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Flow> {
        Box::pin(async move {
            match self.gate.check(ctx).await {
                Ok(()) => Flow::Next,
                Err(failure) => {
                    tracing::debug!(stage = self.label, path = ctx.path(), "Gate rejected request");
                    render_failure(ctx, failure);
                    Flow::NextRoute
                }
            }
        })
    }

    fn label(&self) -> &str {
        self.label
    }
}

/// Write the reply for a rejected gate.
pub fn render_failure(ctx: &mut RequestContext, failure: GateFailure) {
    match failure {
        GateFailure::Message(message) => ctx.send(StatusCode::BAD_REQUEST, message),
        GateFailure::Body(body) => ctx.json(StatusCode::BAD_REQUEST, &body),
        GateFailure::Http(err) => ctx.send(err.status(), err.message().to_string()),
        GateFailure::Other(err) => ctx.send(StatusCode::BAD_REQUEST, format!("{err:?}")),
    }
}

/// Expand a guarded action into its chain fragment.
pub fn assemble(guarded: Guarded, verb: Verb, path: &str) -> CompileResult<Vec<Handler>> {
    let Guarded {
        validate,
        sanitize,
        execute,
    } = guarded;

    let execute = execute.ok_or_else(|| CompileError::MissingExecute {
        verb,
        path: path.to_string(),
    })?;

    let mut chain: Vec<Handler> = Vec::with_capacity(3);
    if let Some(gate) = validate {
        chain.push(Arc::new(GateStage { label: "validate", gate }));
    }
    if let Some(gate) = sanitize {
        chain.push(Arc::new(GateStage { label: "sanitize", gate }));
    }
    chain.push(execute);
    Ok(chain)
}
