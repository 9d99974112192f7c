//! The sequence of sink operations a compilation produces.

use std::fmt;

use crate::compiler::error::{CompileError, CompileResult};
use crate::routing::{DispatchSink, Handler, ParamHandler, Verb};

/// One registration, in the order the specification declared it.
#[derive(Clone)]
pub enum Binding {
    Route {
        verb: Verb,
        path: String,
        chain: Vec<Handler>,
    },
    Mount {
        path: String,
        handlers: Vec<Handler>,
    },
    Param {
        name: String,
        loader: ParamHandler,
    },
}

impl Binding {
    /// Write this binding into `sink`.
    pub fn apply(self, sink: &mut dyn DispatchSink) {
        match self {
            Binding::Route { verb, path, chain } => sink.bind(verb, &path, chain),
            Binding::Mount { path, handlers } => sink.mount(&path, handlers),
            Binding::Param { name, loader } => sink.param(&name, loader),
        }
    }

    /// One-line summary, e.g. `GET /items [validate, handler]`.
    pub fn describe(&self) -> String {
        match self {
            Binding::Route { verb, path, chain } => {
                let labels: Vec<&str> = chain.iter().map(|h| h.label()).collect();
                format!("{verb} {path} [{}]", labels.join(", "))
            }
            Binding::Mount { path, handlers } => {
                let labels: Vec<&str> = handlers.iter().map(|h| h.label()).collect();
                format!("USE {path} [{}]", labels.join(", "))
            }
            Binding::Param { name, .. } => format!("PARAM :{name}"),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Apply a whole plan to `sink`.
///
/// Verbs are checked against the sink before anything is written, so a
/// rejected plan leaves the sink untouched.
pub fn install(plan: Vec<Binding>, sink: &mut dyn DispatchSink) -> CompileResult<usize> {
    for binding in &plan {
        if let Binding::Route { verb, path, .. } = binding {
            if !sink.supports(*verb) {
                return Err(CompileError::InvalidVerb {
                    verb: verb.to_string(),
                    path: path.clone(),
                });
            }
        }
    }

    let count = plan.len();
    for binding in plan {
        binding.apply(sink);
    }
    Ok(count)
}
