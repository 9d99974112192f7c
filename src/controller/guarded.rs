//! Guarded actions: optional validate and sanitize gates in front of an execute handler.

use std::fmt;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture};
use serde_json::Value;

use crate::http::HttpError;
use crate::routing::{Handler, RequestContext};

/// Why a gate rejected a request.
#[derive(Debug)]
pub enum GateFailure {
    /// Sent back as a 400 with the message as body.
    Message(String),
    /// Sent back as a 400 with the value as JSON body.
    Body(Value),
    /// Sent back with the error's own status and message.
    Http(HttpError),
    /// Sent back as a 400 with the debug representation of the error.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl GateFailure {
    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<HttpError> for GateFailure {
    fn from(err: HttpError) -> Self {
        Self::Http(err)
    }
}

impl From<String> for GateFailure {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for GateFailure {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<Value> for GateFailure {
    fn from(body: Value) -> Self {
        Self::Body(body)
    }
}

/// A validate or sanitize stage.
pub trait Gate: Send + Sync {
    fn check<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<(), GateFailure>>;
}

pub type GateRef = Arc<dyn Gate>;

struct GateFn<F>(F);

impl<F> Gate for GateFn<F>
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, Result<(), GateFailure>> + Send + Sync,
{
    fn check<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<(), GateFailure>> {
        (self.0)(ctx)
    }
}

/// Wrap an async closure as a gate.
pub fn gate_fn<F>(f: F) -> GateRef
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, Result<(), GateFailure>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(GateFn(f))
}

struct SyncGate<F>(F);

impl<F> Gate for SyncGate<F>
where
    F: Fn(&mut RequestContext) -> Result<(), GateFailure> + Send + Sync,
{
    fn check<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<(), GateFailure>> {
        Box::pin(future::ready((self.0)(ctx)))
    }
}

/// Wrap a synchronous closure as a gate.
pub fn sync_gate<F>(f: F) -> GateRef
where
    F: Fn(&mut RequestContext) -> Result<(), GateFailure> + Send + Sync + 'static,
{
    Arc::new(SyncGate(f))
}

/// An action split into validate, sanitize and execute stages.
///
/// `execute` is required at compile time; building without one is allowed
/// so that the compiler can report which route is missing it.
#[derive(Clone, Default)]
pub struct Guarded {
    pub(crate) validate: Option<GateRef>,
    pub(crate) sanitize: Option<GateRef>,
    pub(crate) execute: Option<Handler>,
}

impl Guarded {
    pub fn new(execute: Handler) -> Self {
        Self {
            execute: Some(execute),
            ..Self::default()
        }
    }

    pub fn validate(mut self, gate: GateRef) -> Self {
        self.validate = Some(gate);
        self
    }

    pub fn sanitize(mut self, gate: GateRef) -> Self {
        self.sanitize = Some(gate);
        self
    }

    pub fn execute(mut self, handler: Handler) -> Self {
        self.execute = Some(handler);
        self
    }
}

impl fmt::Debug for Guarded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guarded")
            .field("validate", &self.validate.is_some())
            .field("sanitize", &self.sanitize.is_some())
            .field("execute", &self.execute.is_some())
            .finish()
    }
}
