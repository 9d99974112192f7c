//! In-memory JSON document collection exposed as a resource controller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use dashmap::DashMap;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::controller::action::ActionResult;
use crate::controller::guarded::{sync_gate, GateFailure, GateRef, Guarded};
use crate::controller::resource::ResourceController;
use crate::http::HttpError;
use crate::routing::{sync_handler, Flow, RequestContext};

struct Document {
    seq: u64,
    body: Map<String, Value>,
}

/// A schemaless collection of JSON objects keyed by generated ids.
///
/// Responses: create → `{"_id": ...}`, list → array in insertion order,
/// update/delete → `true`, unknown id → 404.
#[derive(Clone)]
pub struct MemoryResource {
    id_param: String,
    required: Vec<String>,
    documents: Arc<DashMap<String, Document>>,
    next_seq: Arc<AtomicU64>,
}

impl MemoryResource {
    /// `id_param` must match the `id` of the `resource` entry the controller is bound to.
    pub fn new(id_param: impl Into<String>) -> Self {
        Self {
            id_param: id_param.into(),
            required: Vec::new(),
            documents: Arc::new(DashMap::new()),
            next_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Reject create and update bodies that lack `field`.
    pub fn require(mut self, field: impl Into<String>) -> Self {
        self.required.push(field.into());
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn target_id(&self, ctx: &mut RequestContext) -> Option<String> {
        let id = ctx.param(&self.id_param).map(str::to_string);
        if id.is_none() {
            tracing::error!(param = %self.id_param, path = ctx.path(), "Resource id parameter not captured");
            ctx.send(StatusCode::INTERNAL_SERVER_ERROR, "Resource id parameter not captured");
        }
        id
    }

    /// Body must be a JSON object carrying every required field.
    fn validate_body(&self) -> GateRef {
        let required = self.required.clone();
        sync_gate(move |ctx| {
            let body: Value = ctx
                .body_json()
                .map_err(|e| HttpError::bad_request(format!("invalid JSON body: {e}")))?;
            let Value::Object(fields) = body else {
                return Err("request body must be a JSON object".into());
            };

            let missing: Vec<&String> = required.iter().filter(|f| !fields.contains_key(*f)).collect();
            if !missing.is_empty() {
                return Err(GateFailure::Body(json!({ "errors": { "missing": missing } })));
            }
            Ok(())
        })
    }

    /// Clients never choose the `_id`.
    fn strip_id() -> GateRef {
        sync_gate(|ctx| {
            let mut body: Map<String, Value> = ctx.body_json().map_err(GateFailure::other)?;
            if body.remove("_id").is_some() {
                let bytes = serde_json::to_vec(&body).map_err(GateFailure::other)?;
                ctx.set_body(bytes);
            }
            Ok(())
        })
    }
}

impl ResourceController for MemoryResource {
    fn get_all(&self) -> ActionResult {
        let store = self.clone();
        ActionResult::handler(sync_handler(move |ctx| {
            let mut docs: Vec<(u64, Value)> = store
                .documents
                .iter()
                .map(|entry| (entry.seq, Value::Object(entry.body.clone())))
                .collect();
            docs.sort_by_key(|(seq, _)| *seq);

            let items: Vec<Value> = docs.into_iter().map(|(_, body)| body).collect();
            ctx.json(StatusCode::OK, &items);
            Flow::Halt
        }))
    }

    fn create(&self) -> ActionResult {
        let store = self.clone();
        let execute = sync_handler(move |ctx| {
            let mut body: Map<String, Value> = match ctx.body_json() {
                Ok(body) => body,
                Err(e) => {
                    ctx.send(StatusCode::BAD_REQUEST, format!("invalid JSON body: {e}"));
                    return Flow::Halt;
                }
            };

            let id = Uuid::new_v4().simple().to_string();
            body.insert("_id".to_string(), Value::String(id.clone()));
            let seq = store.next_seq.fetch_add(1, Ordering::Relaxed);
            store.documents.insert(id.clone(), Document { seq, body });

            tracing::debug!(id = %id, "Document created");
            ctx.json(StatusCode::OK, &json!({ "_id": id }));
            Flow::Halt
        });

        Guarded::new(execute)
            .validate(self.validate_body())
            .sanitize(Self::strip_id())
            .into()
    }

    fn get(&self) -> ActionResult {
        let store = self.clone();
        ActionResult::handler(sync_handler(move |ctx| {
            let Some(id) = store.target_id(ctx) else {
                return Flow::Halt;
            };
            let found = store
                .documents
                .get(&id)
                .map(|doc| Value::Object(doc.body.clone()));

            match found {
                Some(body) => ctx.json(StatusCode::OK, &body),
                None => ctx.send(StatusCode::NOT_FOUND, format!("{id} not found")),
            }
            Flow::Halt
        }))
    }

    fn update(&self) -> ActionResult {
        let store = self.clone();
        let execute = sync_handler(move |ctx| {
            let Some(id) = store.target_id(ctx) else {
                return Flow::Halt;
            };
            let mut body: Map<String, Value> = match ctx.body_json() {
                Ok(body) => body,
                Err(e) => {
                    ctx.send(StatusCode::BAD_REQUEST, format!("invalid JSON body: {e}"));
                    return Flow::Halt;
                }
            };

            match store.documents.get_mut(&id) {
                Some(mut doc) => {
                    body.insert("_id".to_string(), Value::String(id.clone()));
                    doc.body = body;
                    ctx.json(StatusCode::OK, &true);
                }
                None => ctx.send(StatusCode::NOT_FOUND, format!("{id} not found")),
            }
            Flow::Halt
        });

        Guarded::new(execute)
            .validate(self.validate_body())
            .sanitize(Self::strip_id())
            .into()
    }

    fn delete(&self) -> ActionResult {
        let store = self.clone();
        ActionResult::handler(sync_handler(move |ctx| {
            let Some(id) = store.target_id(ctx) else {
                return Flow::Halt;
            };
            match store.documents.remove(&id) {
                Some(_) => ctx.json(StatusCode::OK, &true),
                None => ctx.send(StatusCode::NOT_FOUND, format!("{id} not found")),
            }
            Flow::Halt
        }))
    }
}
