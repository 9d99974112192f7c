//! Controllers, action references and what actions produce.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::compiler::error::CompileError;
use crate::controller::guarded::Guarded;
use crate::routing::{Handler, ParamHandler};

/// A `Controller@method` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionRef {
    pub controller: String,
    pub method: String,
}

impl ActionRef {
    pub fn new(controller: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            method: method.into(),
        }
    }
}

impl FromStr for ActionRef {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('@').collect();
        match parts.as_slice() {
            [controller, method] if !controller.is_empty() && !method.is_empty() => {
                Ok(Self::new(*controller, *method))
            }
            _ => Err(CompileError::MalformedAction(s.to_string())),
        }
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.controller, self.method)
    }
}

/// What invoking a controller action yields.
pub enum ActionResult {
    /// Appended to the chain as-is.
    Handlers(Vec<Handler>),
    /// Expanded into validate → sanitize → execute.
    Guarded(Guarded),
    /// A loader for a `:param` binding.
    ParamLoader(ParamHandler),
}

impl ActionResult {
    pub fn handler(handler: Handler) -> Self {
        Self::Handlers(vec![handler])
    }

    /// Human name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionResult::Handlers(_) => "handlers",
            ActionResult::Guarded(_) => "a guarded handler",
            ActionResult::ParamLoader(_) => "a param loader",
        }
    }
}

impl From<Handler> for ActionResult {
    fn from(handler: Handler) -> Self {
        Self::handler(handler)
    }
}

impl From<Vec<Handler>> for ActionResult {
    fn from(handlers: Vec<Handler>) -> Self {
        Self::Handlers(handlers)
    }
}

impl From<Guarded> for ActionResult {
    fn from(guarded: Guarded) -> Self {
        Self::Guarded(guarded)
    }
}

impl From<ParamHandler> for ActionResult {
    fn from(loader: ParamHandler) -> Self {
        Self::ParamLoader(loader)
    }
}

/// A named controller operation. Closures capture whatever state the
/// controller needs, so the receiver stays bound at request time.
pub type Action = Arc<dyn Fn() -> ActionResult + Send + Sync>;

/// A record of named actions.
#[derive(Clone, Default)]
pub struct Controller {
    actions: HashMap<String, Action>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action named `name`.
    pub fn action<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> ActionResult + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(f));
        self
    }

    /// Look up an action by exact name.
    pub fn method(&self, name: &str) -> Option<Action> {
        self.actions.get(name).cloned()
    }

    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("actions", &self.method_names())
            .finish()
    }
}
