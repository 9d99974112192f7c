//! Declarative route-specification compiler.
//!
//! A specification tree of paths, verbs, parameters, `resource` shorthands
//! and before/after middleware compiles, in one pass, into an ordered
//! dispatch table of verb chains, mounts and parameter loaders.

// Core subsystems
pub mod compiler;
pub mod controller;
pub mod routing;
pub mod spec;

// Serving
pub mod http;
pub mod views;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use compiler::{CompileError, SpecificationCompiler};
pub use config::AppConfig;
pub use controller::{ActionResult, Controller, Guarded, Registry};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{DispatchSink, Router};
pub use spec::SpecNode;
