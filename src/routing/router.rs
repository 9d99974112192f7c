//! Route table and request-time dispatch.
//!
//! # Responsibilities
//! - Store verb bindings, mounts and parameter loaders in registration order
//! - Walk layers for a request: first registered, first tried
//! - Run parameter loaders before the handlers that captured them
//!
//! # Design Decisions
//! - Immutable once compiled; shared via `Arc` by the serving layer
//! - A `Router` is itself a handler, so compiled routers can be mounted
//!   inside other specifications
//! - `NextRoute` abandons the current chain only; dispatch keeps scanning

use std::collections::HashMap;
use std::fmt;

use futures_util::future::BoxFuture;

use crate::routing::context::RequestContext;
use crate::routing::handler::{run_chain, Flow, Handler, Middleware, ParamHandler};
use crate::routing::matcher::{PathMatch, PathPattern};
use crate::routing::sink::DispatchSink;
use crate::routing::verb::Verb;

enum Layer {
    Route {
        verb: Verb,
        pattern: PathPattern,
        chain: Vec<Handler>,
    },
    Mount {
        pattern: PathPattern,
        handlers: Vec<Handler>,
    },
}

/// A bound verb route, as listed by [`Router::routes`].
pub struct RouteEntry<'a> {
    pub verb: Verb,
    pub path: &'a str,
    pub chain: &'a [Handler],
}

impl RouteEntry<'_> {
    /// Labels of the handlers in the chain, in order.
    pub fn labels(&self) -> Vec<&str> {
        self.chain.iter().map(|h| h.label()).collect()
    }
}

/// A mount, as listed by [`Router::mounts`].
pub struct MountEntry<'a> {
    pub path: &'a str,
    pub handlers: &'a [Handler],
}

/// The dispatch table a specification compiles into.
#[derive(Default)]
pub struct Router {
    layers: Vec<Layer>,
    params: HashMap<String, Vec<ParamHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verb routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = RouteEntry<'_>> {
        self.layers.iter().filter_map(|layer| match layer {
            Layer::Route { verb, pattern, chain } => Some(RouteEntry {
                verb: *verb,
                path: pattern.as_str(),
                chain,
            }),
            Layer::Mount { .. } => None,
        })
    }

    /// Mounts in registration order.
    pub fn mounts(&self) -> impl Iterator<Item = MountEntry<'_>> {
        self.layers.iter().filter_map(|layer| match layer {
            Layer::Mount { pattern, handlers } => Some(MountEntry {
                path: pattern.as_str(),
                handlers,
            }),
            Layer::Route { .. } => None,
        })
    }

    /// (verb, path) of every bound route, in registration order.
    pub fn bindings(&self) -> Vec<(Verb, String)> {
        self.routes()
            .map(|route| (route.verb, route.path.to_string()))
            .collect()
    }

    /// Parameter names with registered loaders, sorted.
    pub fn param_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.params.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Loaders registered for `name`, in registration order.
    pub fn param_handlers(&self, name: &str) -> &[ParamHandler] {
        self.params.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of layers (routes and mounts).
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty() && self.params.is_empty()
    }

    /// Dispatch a request through the table.
    ///
    /// Returns `Flow::Halt` once a handler finalizes the reply, `Flow::Next`
    /// when every matching layer fell through.
    pub fn dispatch<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Flow> {
        Box::pin(async move {
            let mut loaded = HashMap::new();
            for layer in &self.layers {
                match layer {
                    Layer::Route { verb, pattern, chain } => {
                        if !verb.matches(ctx.method()) {
                            continue;
                        }
                        let Some(m) = pattern.match_exact(ctx.path()) else {
                            continue;
                        };

                        tracing::trace!(verb = %verb, path = pattern.as_str(), "Route matched");
                        match self.enter(pattern, m, &mut loaded, ctx).await {
                            Flow::Next => {}
                            Flow::NextRoute => continue,
                            Flow::Halt => return Flow::Halt,
                        }
                        if run_chain(chain, ctx).await == Flow::Halt {
                            return Flow::Halt;
                        }
                    }
                    Layer::Mount { pattern, handlers } => {
                        let Some(m) = pattern.match_prefix(ctx.path()) else {
                            continue;
                        };

                        let matched = m.matched.clone();
                        let remainder = m.remainder.clone();
                        match self.enter(pattern, m, &mut loaded, ctx).await {
                            Flow::Next => {}
                            Flow::NextRoute => continue,
                            Flow::Halt => return Flow::Halt,
                        }

                        let saved = ctx.enter_mount(&matched, remainder);
                        let flow = run_chain(handlers, ctx).await;
                        ctx.leave_mount(saved);
                        if flow == Flow::Halt {
                            return Flow::Halt;
                        }
                    }
                }
            }
            Flow::Next
        })
    }

    /// Capture params for a matched layer and run their loaders.
    ///
    /// `loaded` belongs to one dispatch through this router, so each value runs
    /// this router's loaders once while a mounted router keeps its own record.
    async fn enter(
        &self,
        pattern: &PathPattern,
        m: PathMatch,
        loaded: &mut HashMap<String, String>,
        ctx: &mut RequestContext,
    ) -> Flow {
        ctx.capture_params(m.params);

        for name in pattern.param_names() {
            let loaders = self.param_handlers(name);
            if loaders.is_empty() {
                continue;
            }
            let Some(value) = ctx.param(name).map(str::to_string) else {
                continue;
            };
            if loaded.get(name) == Some(&value) {
                continue;
            }
            loaded.insert(name.to_string(), value.clone());

            for loader in loaders {
                match loader.load(ctx, value.clone()).await {
                    Flow::Next => {}
                    stop => return stop,
                }
            }
        }
        Flow::Next
    }
}

impl DispatchSink for Router {
    fn bind(&mut self, verb: Verb, path: &str, chain: Vec<Handler>) {
        self.layers.push(Layer::Route {
            verb,
            pattern: PathPattern::parse(path),
            chain,
        });
    }

    fn mount(&mut self, path: &str, handlers: Vec<Handler>) {
        self.layers.push(Layer::Mount {
            pattern: PathPattern::parse(path),
            handlers,
        });
    }

    fn param(&mut self, name: &str, handler: ParamHandler) {
        self.params.entry(name.to_string()).or_default().push(handler);
    }
}

impl Middleware for Router {
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Flow> {
        self.dispatch(ctx)
    }

    fn label(&self) -> &str {
        "router"
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for layer in &self.layers {
            match layer {
                Layer::Route { verb, pattern, chain } => {
                    list.entry(&format_args!("{} {} ({} handlers)", verb, pattern.as_str(), chain.len()))
                }
                Layer::Mount { pattern, handlers } => {
                    list.entry(&format_args!("USE {} ({} handlers)", pattern.as_str(), handlers.len()))
                }
            };
        }
        list.finish()
    }
}
