//! `Controller@method` and middleware-name resolution against a [`Registry`].

use crate::compiler::error::{CompileError, CompileResult};
use crate::controller::{Action, ActionRef, ActionResult, Registry};
use crate::routing::Handler;
use crate::spec::MiddlewareRef;

/// A resolved action, still tied to the controller that owns it.
#[derive(Clone)]
pub struct BoundAction {
    pub reference: ActionRef,
    action: Action,
}

impl BoundAction {
    /// Run the action to obtain what it contributes to a chain.
    pub fn invoke(&self) -> ActionResult {
        (self.action)()
    }
}

impl std::fmt::Debug for BoundAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoundAction({})", self.reference)
    }
}

/// Look up `action` (`Controller@method`) in `registry`.
pub fn resolve(registry: &Registry, action: &str) -> CompileResult<BoundAction> {
    let reference: ActionRef = action.parse()?;

    let controller = registry
        .controller(&reference.controller)
        .ok_or_else(|| CompileError::UnknownController(reference.controller.clone()))?;

    let action = controller
        .method(&reference.method)
        .ok_or_else(|| CompileError::UnknownMethod {
            controller: reference.controller.clone(),
            method: reference.method.clone(),
        })?;

    Ok(BoundAction { reference, action })
}

/// Turn middleware references into handlers, keeping their order.
pub fn resolve_middleware(registry: &Registry, refs: &[MiddlewareRef]) -> CompileResult<Vec<Handler>> {
    refs.iter()
        .map(|r| match r {
            MiddlewareRef::Handler(handler) => Ok(handler.clone()),
            MiddlewareRef::Named(name) => registry
                .middleware(name)
                .cloned()
                .ok_or_else(|| CompileError::UnknownMiddleware(name.clone())),
        })
        .collect()
}
