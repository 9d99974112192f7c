//! Controllers backing a `resource` entry.

use std::sync::Arc;

use crate::controller::action::{ActionResult, Controller};

/// Action names a `resource` entry expands to, in binding order.
pub const RESOURCE_ACTIONS: [&str; 5] = ["getAll", "create", "get", "update", "delete"];

/// The five operations of a REST collection.
pub trait ResourceController: Send + Sync + 'static {
    fn get_all(&self) -> ActionResult;
    fn create(&self) -> ActionResult;
    fn get(&self) -> ActionResult;
    fn update(&self) -> ActionResult;
    fn delete(&self) -> ActionResult;
}

impl Controller {
    /// Expose a [`ResourceController`] under the action names of [`RESOURCE_ACTIONS`].
    pub fn resource<R: ResourceController>(resource: Arc<R>) -> Self {
        let ops: [fn(&R) -> ActionResult; 5] =
            [R::get_all, R::create, R::get, R::update, R::delete];

        RESOURCE_ACTIONS
            .iter()
            .zip(ops)
            .fold(Controller::new(), |controller, (name, op)| {
                let resource = resource.clone();
                controller.action(*name, move || op(resource.as_ref()))
            })
    }
}
