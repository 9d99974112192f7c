//! The recursive tree walk.

use crate::compiler::error::{CompileError, CompileResult};
use crate::compiler::plan::{install, Binding};
use crate::compiler::resolve::{resolve, resolve_middleware};
use crate::compiler::verb::{expand_resource, verb_chain};
use crate::controller::{ActionResult, Registry};
use crate::routing::{sync_param, DispatchSink, Flow, Handler, ParamHandler, Router};
use crate::spec::{join_path, normalize, Entry, MiddlewareRef, ParamSpec, SpecMap, SpecNode};

/// A named tree of pre-built routers, mounted at the root in declared order.
#[derive(Clone)]
pub enum RouterTree {
    Router(Handler),
    Group(Vec<(String, RouterTree)>),
}

impl RouterTree {
    pub fn group() -> Self {
        Self::Group(Vec::new())
    }

    /// Add a named child to a group. Ignored on a leaf.
    pub fn with(mut self, name: impl Into<String>, child: impl Into<RouterTree>) -> Self {
        if let Self::Group(children) = &mut self {
            children.push((name.into(), child.into()));
        }
        self
    }

    fn collect<'a>(&'a self, name: &str, out: &mut Vec<(String, &'a Handler)>) {
        match self {
            RouterTree::Router(handler) => out.push((name.to_string(), handler)),
            RouterTree::Group(children) => {
                for (child, tree) in children {
                    let qualified = if name.is_empty() {
                        child.clone()
                    } else {
                        format!("{name}.{child}")
                    };
                    tree.collect(&qualified, out);
                }
            }
        }
    }
}

impl From<Router> for RouterTree {
    fn from(router: Router) -> Self {
        Self::Router(std::sync::Arc::new(router))
    }
}

impl From<Handler> for RouterTree {
    fn from(handler: Handler) -> Self {
        Self::Router(handler)
    }
}

/// Compiles specification trees against a controller registry.
///
/// Compilation produces a full plan before touching the sink, so a failing
/// specification never leaves partial bindings behind.
pub struct SpecificationCompiler<'r> {
    registry: &'r Registry,
}

impl<'r> SpecificationCompiler<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Compile `node` rooted at `base` into an ordered plan.
    pub fn compile(&self, node: &SpecNode, base: &str) -> CompileResult<Vec<Binding>> {
        let mut plan = Vec::new();
        self.compile_node(node, &normalize(base), &mut plan)?;

        let routes = plan.iter().filter(|b| matches!(b, Binding::Route { .. })).count();
        tracing::info!(
            base,
            bindings = plan.len(),
            routes,
            "Specification compiled"
        );
        Ok(plan)
    }

    /// Compile `node` and write the result into `sink`. Returns the number of bindings.
    pub fn compile_into(&self, node: &SpecNode, base: &str, sink: &mut dyn DispatchSink) -> CompileResult<usize> {
        let plan = self.compile(node, base)?;
        install(plan, sink)
    }

    /// Compile `node` into a fresh [`Router`].
    pub fn build_router(&self, node: &SpecNode, base: &str) -> CompileResult<Router> {
        let mut router = Router::new();
        self.compile_into(node, base, &mut router)?;
        Ok(router)
    }

    /// Mount every router in `tree` at `/`, depth first.
    pub fn mount_routers(&self, tree: &RouterTree, sink: &mut dyn DispatchSink) -> usize {
        let mut routers = Vec::new();
        tree.collect("", &mut routers);

        for (name, handler) in &routers {
            tracing::debug!(router = %name, "Mounting router");
            sink.mount("/", vec![Handler::clone(handler)]);
        }
        routers.len()
    }

    fn compile_node(&self, node: &SpecNode, path: &str, plan: &mut Vec<Binding>) -> CompileResult<()> {
        match node {
            SpecNode::Mount(refs) => self.compile_mount(refs, path, plan),
            SpecNode::Map(map) => self.compile_map(map, path, plan),
        }
    }

    fn compile_map(&self, map: &SpecMap, path: &str, plan: &mut Vec<Binding>) -> CompileResult<()> {
        for entry in map.entries() {
            match entry {
                Entry::Use(refs) => {
                    tracing::debug!(path, count = refs.len(), "use");
                    self.compile_mount(refs, path, plan)?;
                }
                Entry::Path(segment, node) => {
                    let inner = join_path(path, segment);
                    self.compile_node(node, &inner, plan)?;
                }
                Entry::Param(name, spec) => {
                    tracing::debug!(path, param = %name, "param");
                    let loader = self.param_loader(name, spec)?;
                    plan.push(Binding::Param {
                        name: name.clone(),
                        loader,
                    });
                }
                Entry::Verb(verb, spec) => {
                    tracing::debug!(verb = %verb, path, "verb");
                    if let Some(chain) = verb_chain(self.registry, *verb, path, spec)? {
                        plan.push(Binding::Route {
                            verb: *verb,
                            path: path.to_string(),
                            chain,
                        });
                    }
                }
                Entry::Resource(spec) => {
                    tracing::debug!(path, controller = ?spec.controller, "resource");
                    let expanded = expand_resource(spec, path)?;
                    self.compile_map(&expanded, path, plan)?;
                }
            }
        }
        Ok(())
    }

    fn compile_mount(&self, refs: &[MiddlewareRef], path: &str, plan: &mut Vec<Binding>) -> CompileResult<()> {
        let handlers = resolve_middleware(self.registry, refs)?;
        if handlers.is_empty() {
            tracing::debug!(path, "Skipping empty mount");
            return Ok(());
        }
        plan.push(Binding::Mount {
            path: path.to_string(),
            handlers,
        });
        Ok(())
    }

    fn param_loader(&self, name: &str, spec: &ParamSpec) -> CompileResult<ParamHandler> {
        let invalid = || CompileError::InvalidParam {
            name: name.to_string(),
        };
        if name.is_empty() {
            return Err(invalid());
        }

        if let Some(action) = &spec.action {
            return match resolve(self.registry, action)?.invoke() {
                ActionResult::ParamLoader(loader) => Ok(loader),
                other => Err(CompileError::InvalidReturnShape {
                    action: action.clone(),
                    found: other.kind(),
                    expected: "a param loader",
                    site: format!(":{name}"),
                }),
            };
        }

        match &spec.property {
            Some(property) => {
                let property = property.clone();
                Ok(sync_param(move |ctx, value| {
                    ctx.set_property(property.clone(), value);
                    Flow::Next
                }))
            }
            None => Err(invalid()),
        }
    }
}
