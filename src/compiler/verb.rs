//! Verb chains and resource expansion.

use crate::compiler::error::{CompileError, CompileResult};
use crate::compiler::guard;
use crate::compiler::resolve::{resolve, resolve_middleware};
use crate::controller::{ActionResult, Registry};
use crate::routing::{labeled_handler, Flow, Handler, Verb};
use crate::spec::{join_path, ResourceSpec, SpecMap, VerbSpec};

/// Build the chain for `verb` at `path`: before, action or view, after.
///
/// Returns `None` when every part is empty; such a binding is dropped.
pub fn verb_chain(registry: &Registry, verb: Verb, path: &str, spec: &VerbSpec) -> CompileResult<Option<Vec<Handler>>> {
    let body = match (&spec.action, &spec.view) {
        (Some(_), Some(_)) => {
            return Err(CompileError::AmbiguousVerb {
                verb,
                path: path.to_string(),
            })
        }
        (None, None) => {
            return Err(CompileError::IncompleteVerb {
                verb,
                path: path.to_string(),
            })
        }
        (Some(action), None) => action_chain(registry, action, verb, path)?,
        (None, Some(view)) => vec![view_handler(view, !spec.after.is_empty())],
    };

    let mut chain = resolve_middleware(registry, &spec.before)?;
    chain.extend(body);
    chain.extend(resolve_middleware(registry, &spec.after)?);

    if chain.is_empty() {
        tracing::debug!(verb = %verb, path, "Dropping binding with an empty chain");
        return Ok(None);
    }
    Ok(Some(chain))
}

fn action_chain(registry: &Registry, action: &str, verb: Verb, path: &str) -> CompileResult<Vec<Handler>> {
    let bound = resolve(registry, action)?;

    match bound.invoke() {
        ActionResult::Handlers(handlers) => Ok(handlers),
        ActionResult::Guarded(guarded) => guard::assemble(guarded, verb, path),
        other => Err(CompileError::InvalidReturnShape {
            action: action.to_string(),
            found: other.kind(),
            expected: "handlers or a guarded action",
            site: format!("{verb} {path}"),
        }),
    }
}

/// Render `view`; continue into the rest of the chain only when there is one.
fn view_handler(view: &str, has_continuation: bool) -> Handler {
    let view = view.to_string();
    labeled_handler("view", move |ctx| {
        ctx.render(&view);
        if has_continuation {
            Flow::Next
        } else {
            Flow::Halt
        }
    })
}

/// The five-route map a `resource` entry stands for, relative to its path.
pub fn expand_resource(spec: &ResourceSpec, path: &str) -> CompileResult<SpecMap> {
    let controller = spec
        .controller
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| CompileError::MalformedResource {
            path: path.to_string(),
        })?;

    let descriptor = |method: &str| {
        let mut verb = VerbSpec::action(format!("{controller}@{method}"));
        verb.before = spec.before.clone();
        verb.after = spec.after.clone();
        verb
    };

    let item = SpecMap::new()
        .get(descriptor("get"))
        .put(descriptor("update"))
        .delete(descriptor("delete"));

    tracing::debug!(
        controller,
        collection = path,
        item = %join_path(path, &format!(":{}", spec.id)),
        "Expanding resource"
    );

    Ok(SpecMap::new()
        .get(descriptor("getAll"))
        .post(descriptor("create"))
        .path(format!(":{}", spec.id), item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Controller;
    use crate::routing::sync_handler;
    use crate::spec::Entry;

    fn registry() -> Registry {
        Registry::new()
            .with_controller(
                "Foo",
                Controller::new()
                    .action("list", || ActionResult::handler(sync_handler(|_| Flow::Next)))
                    .action("none", || ActionResult::Handlers(Vec::new())),
            )
            .with_middleware("auth", sync_handler(|_| Flow::Next))
    }

    #[test]
    fn test_chain_order() {
        let spec = VerbSpec::action("Foo@list").before("auth").after("auth");
        let chain = verb_chain(&registry(), Verb::Get, "/", &spec).unwrap().unwrap();
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_empty_chain_is_dropped() {
        let spec = VerbSpec::action("Foo@none");
        assert!(verb_chain(&registry(), Verb::Get, "/", &spec).unwrap().is_none());
    }

    #[test]
    fn test_action_and_view_are_exclusive() {
        let mut spec = VerbSpec::action("Foo@list");
        spec.view = Some("index".to_string());
        assert!(matches!(
            verb_chain(&registry(), Verb::Get, "/", &spec),
            Err(CompileError::AmbiguousVerb { .. })
        ));

        assert_eq!(
            verb_chain(&registry(), Verb::Post, "/x", &VerbSpec::default()).unwrap_err(),
            CompileError::IncompleteVerb {
                verb: Verb::Post,
                path: "/x".to_string()
            }
        );
    }

    #[test]
    fn test_resource_requires_controller() {
        assert_eq!(
            expand_resource(&ResourceSpec::default(), "/x").unwrap_err(),
            CompileError::MalformedResource { path: "/x".to_string() }
        );
        assert!(expand_resource(&ResourceSpec::new("", "id"), "/x").is_err());
    }

    #[test]
    fn test_resource_expansion_shape() {
        let map = expand_resource(&ResourceSpec::new("Item", "pid"), "/x").unwrap();
        let entries = map.entries();
        assert_eq!(entries.len(), 3);
        assert!(matches!(&entries[0], Entry::Verb(Verb::Get, v) if v.action.as_deref() == Some("Item@getAll")));
        assert!(matches!(&entries[1], Entry::Verb(Verb::Post, v) if v.action.as_deref() == Some("Item@create")));
        assert!(matches!(&entries[2], Entry::Path(segment, _) if segment == ":pid"));
    }
}
