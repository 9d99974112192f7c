//! Compilation errors. Every one of them is fatal to startup.

use thiserror::Error;

use crate::routing::Verb;

pub type CompileResult<T> = Result<T, CompileError>;

/// Errors detected while parsing or compiling a specification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Action reference is not `Controller@method`.
    #[error("invalid action format [{0}]")]
    MalformedAction(String),

    #[error("controller {0} not found")]
    UnknownController(String),

    #[error("controller {controller} does not define method {method}")]
    UnknownMethod { controller: String, method: String },

    /// Key is neither a path, a param, `use`, `resource` nor a known verb.
    #[error("{verb} is not a valid http verb [{path}]")]
    InvalidVerb { verb: String, path: String },

    #[error("{verb} {path} must define an action or view property")]
    IncompleteVerb { verb: Verb, path: String },

    #[error("{verb} {path} must define either an action or a view, not both")]
    AmbiguousVerb { verb: Verb, path: String },

    #[error("resource path {path} is missing 'controller' property")]
    MalformedResource { path: String },

    #[error("invalid parameter specification (:{name}); expected an action or property")]
    InvalidParam { name: String },

    #[error("specification at {path} must be an object, handler, or handler list")]
    InvalidNode { path: String },

    /// A descriptor field has the wrong type.
    #[error("invalid '{field}' at {path}: {reason}")]
    InvalidField {
        path: String,
        field: String,
        reason: String,
    },

    /// An action produced a result the binding site cannot use.
    #[error("action {action} returned {found}, expected {expected} [{site}]")]
    InvalidReturnShape {
        action: String,
        found: &'static str,
        expected: &'static str,
        site: String,
    },

    #[error("controller method must define an 'execute' property [{verb} {path}]")]
    MissingExecute { verb: Verb, path: String },

    #[error("middleware {0} not found")]
    UnknownMiddleware(String),
}
