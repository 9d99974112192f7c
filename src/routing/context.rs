//! Per-request state shared by every handler in a chain.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{request::Parts, Extensions, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::views::{NoViews, ViewEngine};

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";

/// A response written by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Bytes,
}

impl Reply {
    pub fn new(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    /// Body as UTF-8, empty if it isn't.
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or_default()
    }
}

/// The in-flight request and its pending response.
///
/// Paths are tracked relative to the innermost mount: a handler mounted at
/// `/api` sees `/users` for a request to `/api/users`, and `base()` returns `/api`.
pub struct RequestContext {
    method: Method,
    base: String,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
    properties: Map<String, Value>,
    extensions: Extensions,
    views: Arc<dyn ViewEngine>,
    request_id: Option<String>,
    reply: Option<Reply>,
}

impl RequestContext {
    /// Create a context for `method` and `uri`. A query string after `?` is split off.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (uri, None),
        };

        Self {
            method,
            base: String::new(),
            path: if path.is_empty() { "/".to_string() } else { path },
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            params: HashMap::new(),
            properties: Map::new(),
            extensions: Extensions::new(),
            views: Arc::new(NoViews),
            request_id: None,
            reply: None,
        }
    }

    /// Build a context from axum request parts and a buffered body.
    pub fn from_parts(parts: Parts, body: Bytes, views: Arc<dyn ViewEngine>) -> Self {
        let uri = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());
        let request_id = parts
            .headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut ctx = Self::new(parts.method, uri).with_body(body).with_views(views);
        ctx.headers = parts.headers;
        ctx.extensions = parts.extensions;
        ctx.request_id = request_id;
        ctx
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_views(mut self, views: Arc<dyn ViewEngine>) -> Self {
        self.views = views;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the current mount point.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Mount prefix stripped from the original path, empty at the root.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The full request path.
    pub fn original_path(&self) -> String {
        if self.base.is_empty() {
            self.path.clone()
        } else if self.path == "/" {
            self.base.clone()
        } else {
            format!("{}{}", self.base, self.path)
        }
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    /// Deserialize the body as JSON.
    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// A captured path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub(crate) fn capture_params(&mut self, params: Vec<(String, String)>) {
        self.params.extend(params);
    }

    /// A request-scoped property set by an earlier handler or param binding.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Enter a mount: `matched` moves from the path onto the base.
    pub(crate) fn enter_mount(&mut self, matched: &str, remainder: String) -> (String, String) {
        let saved = (self.base.clone(), std::mem::replace(&mut self.path, remainder));
        if matched != "/" {
            self.base.push_str(matched);
        }
        saved
    }

    pub(crate) fn leave_mount(&mut self, saved: (String, String)) {
        (self.base, self.path) = saved;
    }

    /// Write a plain text reply. A later reply replaces an earlier one.
    pub fn send(&mut self, status: StatusCode, body: impl Into<Bytes>) {
        self.set_reply(Reply::new(status, TEXT_PLAIN, body));
    }

    /// Write a JSON reply.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => self.set_reply(Reply::new(status, APPLICATION_JSON, body)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize JSON reply");
                self.send(StatusCode::INTERNAL_SERVER_ERROR, "Failed to serialize response");
            }
        }
    }

    /// Render `view` with the request properties as locals.
    pub fn render(&mut self, view: &str) {
        match self.views.render(view, &self.properties) {
            Ok(html) => self.set_reply(Reply::new(StatusCode::OK, TEXT_HTML, html)),
            Err(e) => {
                tracing::warn!(view, error = %e, "View rendering failed");
                self.send(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
            }
        }
    }

    pub fn set_reply(&mut self, reply: Reply) {
        if let Some(previous) = &self.reply {
            tracing::debug!(
                previous = %previous.status,
                status = %reply.status,
                "Replacing earlier reply"
            );
        }
        self.reply = Some(reply);
    }

    pub fn reply(&self) -> Option<&Reply> {
        self.reply.as_ref()
    }

    pub fn take_reply(&mut self) -> Option<Reply> {
        self.reply.take()
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.method)
            .field("base", &self.base)
            .field("path", &self.path)
            .field("params", &self.params)
            .field("properties", &self.properties)
            .field("reply", &self.reply)
            .finish_non_exhaustive()
    }
}
