//! Controllers and named middleware available to a specification.

use std::collections::HashMap;
use std::fmt;

use crate::controller::action::Controller;
use crate::routing::Handler;

/// Read-only lookup tables consulted while compiling.
#[derive(Clone, Default)]
pub struct Registry {
    controllers: HashMap<String, Controller>,
    middleware: HashMap<String, Handler>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_controller(mut self, name: impl Into<String>, controller: Controller) -> Self {
        self.insert_controller(name, controller);
        self
    }

    pub fn insert_controller(&mut self, name: impl Into<String>, controller: Controller) {
        self.controllers.insert(name.into(), controller);
    }

    /// Register a handler that specification files can reference by name.
    pub fn with_middleware(mut self, name: impl Into<String>, handler: Handler) -> Self {
        self.insert_middleware(name, handler);
        self
    }

    pub fn insert_middleware(&mut self, name: impl Into<String>, handler: Handler) {
        self.middleware.insert(name.into(), handler);
    }

    pub fn controller(&self, name: &str) -> Option<&Controller> {
        self.controllers.get(name)
    }

    pub fn middleware(&self, name: &str) -> Option<&Handler> {
        self.middleware.get(name)
    }

    pub fn controller_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.controllers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut middleware: Vec<&str> = self.middleware.keys().map(String::as_str).collect();
        middleware.sort_unstable();
        f.debug_struct("Registry")
            .field("controllers", &self.controllers)
            .field("middleware", &middleware)
            .finish()
    }
}
