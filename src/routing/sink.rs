//! The registration surface a compiled specification is written into.

use crate::routing::handler::{Handler, ParamHandler};
use crate::routing::verb::Verb;

/// Receives verb bindings, mounts and parameter loaders in registration order.
///
/// Implementations must keep the order they are called in: later layers only
/// run when earlier ones fall through.
pub trait DispatchSink {
    /// Whether this sink can bind routes for `verb`.
    fn supports(&self, _verb: Verb) -> bool {
        true
    }

    /// Bind `chain` to requests with `verb` whose path matches `path` exactly.
    fn bind(&mut self, verb: Verb, path: &str, chain: Vec<Handler>);

    /// Run `handlers` for every request whose path starts with `path`.
    fn mount(&mut self, path: &str, handlers: Vec<Handler>);

    /// Register a loader for the path parameter `name`.
    fn param(&mut self, name: &str, handler: ParamHandler);
}
