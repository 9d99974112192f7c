//! Controller subsystem.
//!
//! # Responsibilities
//! - Name the operations a specification can reference (`Controller@method`)
//! - Describe what an operation contributes to a chain ([`ActionResult`])
//! - Hold controllers and named middleware in a read-only [`Registry`]
//!
//! # Design Decisions
//! - Operations are closures over their controller's state, so resolution
//!   is a map lookup and the receiver stays bound at request time
//! - Results are a closed enum; the compiler matches on it instead of
//!   probing shapes at runtime

pub mod action;
pub mod guarded;
pub mod memory;
pub mod registry;
pub mod resource;

pub use action::{Action, ActionRef, ActionResult, Controller};
pub use guarded::{gate_fn, sync_gate, Gate, GateFailure, GateRef, Guarded};
pub use memory::MemoryResource;
pub use registry::Registry;
pub use resource::{ResourceController, RESOURCE_ACTIONS};
