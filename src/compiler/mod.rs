//! Specification compiler.
//!
//! # Data Flow
//! ```text
//! SpecNode ──walk──▶ Vec<Binding> ──install──▶ DispatchSink (Router)
//!              │
//!              ├─ verb: before + action/view + after
//!              ├─ resource: synthesized SpecMap, walked like any other map
//!              └─ action: Registry lookup → ActionResult → chain fragment
//! ```
//!
//! # Responsibilities
//! - Walk the tree in declared order, composing paths
//! - Resolve `Controller@method` references and named middleware
//! - Expand guarded actions into validate → sanitize → execute
//! - Report every malformed input as a [`CompileError`]
//!
//! # Design Decisions
//! - One pass at startup; no incremental recompilation
//! - The whole plan is built before the sink is written, so a failure at
//!   any node leaves the sink as it was
//! - Chains that end up empty are dropped, not bound

pub mod error;
pub mod guard;
pub mod plan;
pub mod resolve;
pub mod verb;
pub mod walk;

pub use error::{CompileError, CompileResult};
pub use guard::render_failure;
pub use plan::{install, Binding};
pub use resolve::{resolve, resolve_middleware, BoundAction};
pub use walk::{RouterTree, SpecificationCompiler};
