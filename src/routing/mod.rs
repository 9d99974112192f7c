//! Routing subsystem: the dispatch table a specification compiles into.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     compiler::Binding[]
//!     → sink.rs (DispatchSink: bind / mount / param)
//!     → router.rs (ordered layers + param loaders)
//!     → Freeze as immutable Router
//!
//! Incoming Request (method, path, body)
//!     → context.rs (RequestContext)
//!     → router.rs (layer walk, first registered first)
//!     → matcher.rs (exact / prefix match, param capture)
//!     → handler.rs (chain execution, Flow)
//!     → Reply or explicit no-match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment matching only)
//! - Deterministic: same table always dispatches a request the same way
//! - First match wins; later layers run only on fall-through

pub mod context;
pub mod handler;
pub mod matcher;
pub mod router;
pub mod sink;
pub mod verb;

pub use context::{Reply, RequestContext};
pub use handler::{
    handler_fn, labeled_handler, param_fn, run_chain, sync_handler, sync_param, Flow, Handler,
    Middleware, ParamHandler, ParamLoader,
};
pub use matcher::{PathMatch, PathPattern};
pub use router::{MountEntry, RouteEntry, Router};
pub use sink::DispatchSink;
pub use verb::{UnknownVerb, Verb};
