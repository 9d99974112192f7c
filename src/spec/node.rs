//! The typed specification tree.

use std::fmt;
use std::sync::Arc;

use crate::routing::{Handler, Router, Verb};

/// A handler in a `use`, `before` or `after` list.
#[derive(Clone)]
pub enum MiddlewareRef {
    /// A live handler, only available to trees built in code.
    Handler(Handler),
    /// A handler registered in the [`Registry`](crate::controller::Registry) under this name.
    Named(String),
}

impl MiddlewareRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Embed a compiled router.
    pub fn router(router: Router) -> Self {
        Self::Handler(Arc::new(router))
    }
}

impl From<Handler> for MiddlewareRef {
    fn from(handler: Handler) -> Self {
        Self::Handler(handler)
    }
}

impl From<&str> for MiddlewareRef {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for MiddlewareRef {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl fmt::Debug for MiddlewareRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareRef::Handler(h) => write!(f, "Handler({})", h.label()),
            MiddlewareRef::Named(name) => write!(f, "Named({name})"),
        }
    }
}

/// A verb binding: exactly one of `action` or `view`, plus surrounding middleware.
#[derive(Debug, Clone, Default)]
pub struct VerbSpec {
    pub action: Option<String>,
    pub view: Option<String>,
    pub before: Vec<MiddlewareRef>,
    pub after: Vec<MiddlewareRef>,
}

impl VerbSpec {
    /// Bind a `Controller@method` action.
    pub fn action(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            ..Self::default()
        }
    }

    /// Render a view.
    pub fn view(view: impl Into<String>) -> Self {
        Self {
            view: Some(view.into()),
            ..Self::default()
        }
    }

    pub fn before(mut self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.before.push(middleware.into());
        self
    }

    pub fn after(mut self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.after.push(middleware.into());
        self
    }
}

/// A `:name` binding: run an action's param loader, or copy the value onto a request property.
#[derive(Debug, Clone, Default)]
pub struct ParamSpec {
    pub action: Option<String>,
    pub property: Option<String>,
}

impl ParamSpec {
    pub fn action(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            property: None,
        }
    }

    pub fn property(property: impl Into<String>) -> Self {
        Self {
            action: None,
            property: Some(property.into()),
        }
    }
}

/// A `resource` entry: five routes against one controller.
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    pub controller: Option<String>,
    /// Name of the item path parameter.
    pub id: String,
    pub before: Vec<MiddlewareRef>,
    pub after: Vec<MiddlewareRef>,
}

impl ResourceSpec {
    pub fn new(controller: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            controller: Some(controller.into()),
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn before(mut self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.before.push(middleware.into());
        self
    }

    pub fn after(mut self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.after.push(middleware.into());
        self
    }
}

impl Default for ResourceSpec {
    fn default() -> Self {
        Self {
            controller: None,
            id: "id".to_string(),
            before: Vec::new(),
            after: Vec::new(),
        }
    }
}

/// One key of a path-entry map.
#[derive(Debug, Clone)]
pub enum Entry {
    /// `use`: mount middleware at the current path for every verb.
    Use(Vec<MiddlewareRef>),
    /// `/segment`: compile the node under the extended path.
    Path(String, SpecNode),
    /// `:name`: register a parameter loader.
    Param(String, ParamSpec),
    Verb(Verb, VerbSpec),
    Resource(ResourceSpec),
}

/// A path-entry map. Entries keep the order they were declared in.
#[derive(Debug, Clone, Default)]
pub struct SpecMap {
    entries: Vec<Entry>,
}

impl SpecMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn entry(mut self, entry: Entry) -> Self {
        self.push(entry);
        self
    }

    /// `use` entry.
    pub fn mount<I, M>(self, middleware: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MiddlewareRef>,
    {
        self.entry(Entry::Use(middleware.into_iter().map(Into::into).collect()))
    }

    /// `/segment` entry. The leading slash is optional.
    pub fn path(self, segment: impl AsRef<str>, node: impl Into<SpecNode>) -> Self {
        let segment = segment.as_ref();
        let segment = segment.strip_prefix('/').unwrap_or(segment);
        self.entry(Entry::Path(segment.to_string(), node.into()))
    }

    /// `:name` entry. The leading colon is optional.
    pub fn param(self, name: impl AsRef<str>, spec: ParamSpec) -> Self {
        let name = name.as_ref();
        let name = name.strip_prefix(':').unwrap_or(name);
        self.entry(Entry::Param(name.to_string(), spec))
    }

    pub fn verb(self, verb: Verb, spec: VerbSpec) -> Self {
        self.entry(Entry::Verb(verb, spec))
    }

    pub fn get(self, spec: VerbSpec) -> Self {
        self.verb(Verb::Get, spec)
    }

    pub fn post(self, spec: VerbSpec) -> Self {
        self.verb(Verb::Post, spec)
    }

    pub fn put(self, spec: VerbSpec) -> Self {
        self.verb(Verb::Put, spec)
    }

    pub fn delete(self, spec: VerbSpec) -> Self {
        self.verb(Verb::Delete, spec)
    }

    pub fn resource(self, spec: ResourceSpec) -> Self {
        self.entry(Entry::Resource(spec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A specification node.
#[derive(Debug, Clone)]
pub enum SpecNode {
    Map(SpecMap),
    /// Handlers (or compiled routers) mounted at the current path.
    Mount(Vec<MiddlewareRef>),
}

impl SpecNode {
    /// Embed a compiled router at the current path.
    pub fn router(router: Router) -> Self {
        Self::Mount(vec![MiddlewareRef::router(router)])
    }
}

impl From<SpecMap> for SpecNode {
    fn from(map: SpecMap) -> Self {
        Self::Map(map)
    }
}

impl From<Router> for SpecNode {
    fn from(router: Router) -> Self {
        Self::router(router)
    }
}
