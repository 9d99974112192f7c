//! Parse the declarative (JSON/TOML) form into a [`SpecNode`].
//!
//! # Responsibilities
//! - Classify map keys by sigil: `/` path, `:` param, `use`, `resource`, verb
//! - Read verb, param and resource descriptors
//! - Load specification files
//!
//! # Design Decisions
//! - Keys are read in document order (serde_json `preserve_order`)
//! - Handlers cannot appear in data; `use`, `before`, `after` and bare
//!   string/list nodes name middleware registered with the compiler
//! - Only shape is checked here; references are resolved at compile time

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::compiler::error::{CompileError, CompileResult};
use crate::routing::Verb;
use crate::spec::node::{Entry, MiddlewareRef, ParamSpec, ResourceSpec, SpecMap, SpecNode, VerbSpec};
use crate::spec::path::join_path;

/// Errors raised while loading a specification file.
#[derive(Debug, Error)]
pub enum SpecLoadError {
    #[error("failed to read specification {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Load a `.json` or `.toml` specification file.
pub fn load_file(path: &Path) -> Result<SpecNode, SpecLoadError> {
    let shown = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| SpecLoadError::Io {
        path: shown.clone(),
        source,
    })?;

    let value: Value = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|source| SpecLoadError::Toml {
            path: shown.clone(),
            source,
        })?,
        _ => serde_json::from_str(&content).map_err(|source| SpecLoadError::Json {
            path: shown.clone(),
            source,
        })?,
    };

    tracing::debug!(path = %shown, "Specification file loaded");
    Ok(parse(&value)?)
}

/// Parse a specification rooted at `/`.
pub fn parse(value: &Value) -> CompileResult<SpecNode> {
    parse_node(value, "/")
}

/// Parse a specification; `path` only feeds error messages.
pub fn parse_node(value: &Value, path: &str) -> CompileResult<SpecNode> {
    match value {
        Value::Object(map) => parse_map(map, path).map(SpecNode::Map),
        other => names(other)
            .map(SpecNode::Mount)
            .ok_or_else(|| CompileError::InvalidNode {
                path: path.to_string(),
            }),
    }
}

fn parse_map(map: &Map<String, Value>, path: &str) -> CompileResult<SpecMap> {
    let mut spec = SpecMap::new();

    for (key, value) in map {
        let entry = if key == "use" {
            let refs = names(value).ok_or_else(|| invalid_field(path, key, "expected a name or list of names"))?;
            Entry::Use(refs)
        } else if let Some(segment) = key.strip_prefix('/') {
            let inner = join_path(path, segment);
            Entry::Path(segment.to_string(), parse_node(value, &inner)?)
        } else if let Some(name) = key.strip_prefix(':') {
            Entry::Param(name.to_string(), parse_param(name, value)?)
        } else if key == "resource" {
            Entry::Resource(parse_resource(value, path)?)
        } else {
            let verb: Verb = key.parse().map_err(|_| CompileError::InvalidVerb {
                verb: key.clone(),
                path: path.to_string(),
            })?;
            Entry::Verb(verb, parse_verb(value, path, key)?)
        };

        spec.push(entry);
    }

    Ok(spec)
}

fn parse_verb(value: &Value, path: &str, key: &str) -> CompileResult<VerbSpec> {
    let Value::Object(fields) = value else {
        return Err(invalid_field(path, key, "expected an object"));
    };

    Ok(VerbSpec {
        action: string_field(fields, "action", path)?,
        view: string_field(fields, "view", path)?,
        before: names_field(fields, "before", path)?,
        after: names_field(fields, "after", path)?,
    })
}

fn parse_param(name: &str, value: &Value) -> CompileResult<ParamSpec> {
    let invalid = || CompileError::InvalidParam {
        name: name.to_string(),
    };
    let Value::Object(fields) = value else {
        return Err(invalid());
    };

    let string = |field: &str| match fields.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid()),
    };

    Ok(ParamSpec {
        action: string("action")?,
        property: string("property")?,
    })
}

fn parse_resource(value: &Value, path: &str) -> CompileResult<ResourceSpec> {
    let Value::Object(fields) = value else {
        return Err(invalid_field(path, "resource", "expected an object"));
    };

    let mut spec = ResourceSpec {
        controller: string_field(fields, "controller", path)?,
        before: names_field(fields, "before", path)?,
        after: names_field(fields, "after", path)?,
        ..ResourceSpec::default()
    };
    if let Some(id) = string_field(fields, "id", path)? {
        spec.id = id;
    }
    Ok(spec)
}

fn string_field(fields: &Map<String, Value>, field: &str, path: &str) -> CompileResult<Option<String>> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid_field(path, field, "expected a string")),
    }
}

fn names_field(fields: &Map<String, Value>, field: &str, path: &str) -> CompileResult<Vec<MiddlewareRef>> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => names(value).ok_or_else(|| invalid_field(path, field, "expected a name or list of names")),
    }
}

/// A string or list of strings naming middleware.
fn names(value: &Value) -> Option<Vec<MiddlewareRef>> {
    match value {
        Value::String(name) => Some(vec![MiddlewareRef::named(name.as_str())]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(MiddlewareRef::named))
            .collect(),
        _ => None,
    }
}

fn invalid_field(path: &str, field: &str, reason: &str) -> CompileError {
    CompileError::InvalidField {
        path: path.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(node: &SpecNode) -> Vec<String> {
        let SpecNode::Map(map) = node else {
            panic!("expected a map");
        };
        map.entries()
            .iter()
            .map(|entry| match entry {
                Entry::Use(_) => "use".to_string(),
                Entry::Path(segment, _) => format!("/{segment}"),
                Entry::Param(name, _) => format!(":{name}"),
                Entry::Verb(verb, _) => verb.to_string(),
                Entry::Resource(_) => "resource".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_sigils_and_declared_order() {
        let node = parse(&json!({
            "use": ["trace"],
            ":userId": {"property": "userId"},
            "post": {"action": "User@create"},
            "/profile": {"get": {"view": "profile"}},
            "get": {"action": "User@list", "before": "auth"},
            "resource": {"controller": "Item"}
        }))
        .unwrap();

        assert_eq!(keys(&node), vec!["use", ":userId", "POST", "/profile", "GET", "resource"]);
    }

    #[test]
    fn test_verb_descriptor_fields() {
        let node = parse(&json!({
            "put": {"action": "User@update", "before": ["auth", "load"], "after": "audit"}
        }))
        .unwrap();

        let SpecNode::Map(map) = node else { panic!() };
        let Entry::Verb(Verb::Put, spec) = &map.entries()[0] else { panic!() };
        assert_eq!(spec.action.as_deref(), Some("User@update"));
        assert!(spec.view.is_none());
        assert_eq!(spec.before.len(), 2);
        assert_eq!(spec.after.len(), 1);
    }

    #[test]
    fn test_resource_id_defaults() {
        let node = parse(&json!({"resource": {"controller": "Item"}})).unwrap();
        let SpecNode::Map(map) = node else { panic!() };
        let Entry::Resource(spec) = &map.entries()[0] else { panic!() };
        assert_eq!(spec.controller.as_deref(), Some("Item"));
        assert_eq!(spec.id, "id");
    }

    #[test]
    fn test_string_and_list_nodes_are_mounts() {
        let node = parse(&json!({"/legacy": ["legacy-router", "fallback"]})).unwrap();
        let SpecNode::Map(map) = node else { panic!() };
        let Entry::Path(segment, SpecNode::Mount(refs)) = &map.entries()[0] else { panic!() };
        assert_eq!(segment, "legacy");
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn test_invalid_node_shape() {
        assert_eq!(
            parse(&json!({"/a": {"/b": 42}})).unwrap_err(),
            CompileError::InvalidNode { path: "/a/b".to_string() }
        );
        assert!(matches!(parse(&json!(true)), Err(CompileError::InvalidNode { .. })));
        assert!(matches!(parse(&json!([1, 2])), Err(CompileError::InvalidNode { .. })));
    }

    #[test]
    fn test_unknown_verb() {
        assert_eq!(
            parse(&json!({"/a": {"fetch": {"action": "A@b"}}})).unwrap_err(),
            CompileError::InvalidVerb {
                verb: "fetch".to_string(),
                path: "/a".to_string()
            }
        );
    }

    #[test]
    fn test_field_types_are_checked() {
        assert!(matches!(
            parse(&json!({"get": {"action": 5}})),
            Err(CompileError::InvalidField { field, .. }) if field == "action"
        ));
        assert!(matches!(
            parse(&json!({"get": "User@list"})),
            Err(CompileError::InvalidField { field, .. }) if field == "get"
        ));
        assert!(matches!(
            parse(&json!({":id": "User@load"})),
            Err(CompileError::InvalidParam { name }) if name == "id"
        ));
    }

    #[test]
    fn test_toml_keeps_declared_order() {
        let value: Value = toml::from_str(
            r#"
            [post]
            action = "User@create"

            [get]
            action = "User@list"
            "#,
        )
        .unwrap();

        assert_eq!(keys(&parse(&value).unwrap()), vec!["POST", "GET"]);
    }
}
