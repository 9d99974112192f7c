//! Specification trees.
//!
//! # Responsibilities
//! - Model a specification as a typed tree ([`SpecNode`])
//! - Parse the declarative JSON/TOML form into that tree
//! - Compose nested paths
//!
//! # Design Decisions
//! - Sigils are interpreted once, here; the compiler only sees [`Entry`] variants
//! - Map entries are a `Vec`, so declaration order is the registration order

pub mod node;
pub mod parse;
pub mod path;

pub use node::{Entry, MiddlewareRef, ParamSpec, ResourceSpec, SpecMap, SpecNode, VerbSpec};
pub use parse::{load_file, parse, parse_node, SpecLoadError};
pub use path::{join_path, normalize};
