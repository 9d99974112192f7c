//! View rendering.
//!
//! # Responsibilities
//! - Resolve a view name to a template
//! - Render it with request properties as locals
//!
//! # Design Decisions
//! - Templates are read from disk once at startup; rendering never touches the filesystem
//! - `{{ name }}` placeholders only; unknown names render as empty strings

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors raised while loading or rendering views.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("view {0} not found")]
    NotFound(String),

    #[error("failed to read views from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk view directory {path}: {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },
}

/// Renders named views.
pub trait ViewEngine: Send + Sync {
    fn render(&self, view: &str, locals: &Map<String, Value>) -> Result<String, ViewError>;
}

/// Engine used when no view directory is configured. Every view is missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoViews;

impl ViewEngine for NoViews {
    fn render(&self, view: &str, _locals: &Map<String, Value>) -> Result<String, ViewError> {
        Err(ViewError::NotFound(view.to_string()))
    }
}

/// In-memory templates keyed by view name.
#[derive(Debug, Default, Clone)]
pub struct TemplateViews {
    templates: HashMap<String, String>,
}

impl TemplateViews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.<extension>` file under `dir`, keyed by its path relative to
    /// `dir` without the extension (`users/show.html` → `users/show`).
    pub fn from_directory(dir: &Path, extension: &str) -> Result<Self, ViewError> {
        let mut views = Self::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|source| ViewError::Walk {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }

            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };
            let name = relative
                .with_extension("")
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            let body = fs::read_to_string(path).map_err(|source| ViewError::Io {
                path: path.display().to_string(),
                source,
            })?;
            views.templates.insert(name, body);
        }

        tracing::info!(directory = %dir.display(), count = views.templates.len(), "Views loaded");
        Ok(views)
    }

    /// Register a template under `name`.
    pub fn insert(&mut self, name: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(name.into(), template.into());
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl ViewEngine for TemplateViews {
    fn render(&self, view: &str, locals: &Map<String, Value>) -> Result<String, ViewError> {
        let template = self
            .templates
            .get(view)
            .ok_or_else(|| ViewError::NotFound(view.to_string()))?;
        Ok(substitute(template, locals))
    }
}

fn substitute(template: &str, locals: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        out.push_str(&rest[..start]);

        let key = rest[start + 2..start + 2 + len].trim();
        match locals.get(key) {
            Some(Value::String(s)) => out.push_str(s),
            Some(Value::Null) | None => {}
            Some(other) => out.push_str(&other.to_string()),
        }
        rest = &rest[start + 2 + len + 2..];
    }

    out.push_str(rest);
    out
}
