//! Startup from configuration: spec files, resources, views.

use std::fs;

use axum::http::{Method, StatusCode};
use route_compiler::config::{AppConfig, ResourceConfig};
use route_compiler::lifecycle::{prepare, start_metrics, StartupError};
use route_compiler::routing::{RequestContext, Verb};
use route_compiler::spec::SpecLoadError;
use route_compiler::CompileError;

fn config_with(dir: &tempfile::TempDir, spec_file: &str, contents: &str) -> AppConfig {
    let path = dir.path().join(spec_file);
    fs::write(&path, contents).unwrap();

    let mut config = AppConfig::default();
    config.routes.spec_path = Some(path.display().to_string());
    config.resources.push(ResourceConfig {
        controller: "Item".to_string(),
        id: "id".to_string(),
        required: Vec::new(),
    });
    config
}

#[test]
fn test_json_spec_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with(
        &dir,
        "routes.json",
        r#"{ "use": "trace", "/items": { "resource": { "controller": "Item" } } }"#,
    );

    let app = prepare(config).unwrap();
    assert_eq!(app.bindings, 6);
    assert_eq!(app.router.mounts().count(), 1);
    assert_eq!(app.router.bindings()[2], (Verb::Get, "/items/:id".to_string()));
}

#[test]
fn test_toml_spec_file_under_base_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_with(
        &dir,
        "routes.toml",
        r#"
        ["/items"]
        resource = { controller = "Item" }
        "#,
    );
    config.routes.base_path = "/api".to_string();

    let app = prepare(config).unwrap();
    assert_eq!(app.router.bindings()[0], (Verb::Get, "/api/items".to_string()));
}

#[test]
fn test_compile_errors_abort_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with(&dir, "routes.json", r#"{ "get": { "action": "Missing@list" } }"#);

    match prepare(config) {
        Err(StartupError::Spec(SpecLoadError::Compile(_))) => panic!("parse should succeed"),
        Err(StartupError::Compile(err)) => {
            assert_eq!(err, CompileError::UnknownController("Missing".to_string()))
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("startup should fail"),
    }
}

#[test]
fn test_invalid_spec_files() {
    let dir = tempfile::tempdir().unwrap();

    let config = config_with(&dir, "broken.json", "{ not json");
    assert!(matches!(prepare(config), Err(StartupError::Spec(SpecLoadError::Json { .. }))));

    let config = config_with(&dir, "bad-verb.json", r#"{ "fetch": { "action": "Item@get" } }"#);
    assert!(matches!(
        prepare(config),
        Err(StartupError::Spec(SpecLoadError::Compile(CompileError::InvalidVerb { .. })))
    ));

    let mut config = AppConfig::default();
    config.routes.spec_path = Some(dir.path().join("absent.json").display().to_string());
    assert!(matches!(prepare(config), Err(StartupError::Spec(SpecLoadError::Io { .. }))));
}

#[tokio::test]
async fn test_views_directory() {
    let dir = tempfile::tempdir().unwrap();
    let views = dir.path().join("views");
    fs::create_dir_all(views.join("users")).unwrap();
    fs::write(views.join("users").join("show.html"), "user {{ id }}").unwrap();
    fs::write(views.join("notes.txt"), "ignored").unwrap();

    let mut config = config_with(
        &dir,
        "routes.json",
        r#"{ "/users/:id": { ":id": { "property": "id" }, "get": { "view": "users/show" } } }"#,
    );
    config.views.directory = Some(views.display().to_string());

    let app = prepare(config).unwrap();
    let mut ctx = RequestContext::new(Method::GET, "/users/42").with_views(app.views.clone());
    app.router.dispatch(&mut ctx).await;

    let reply = ctx.reply().unwrap();
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.text(), "user 42");
}

#[test]
fn test_no_spec_means_empty_router() {
    let app = prepare(AppConfig::default()).unwrap();
    assert!(app.router.is_empty());
    assert_eq!(app.bindings, 0);
}

#[test]
fn test_metrics_exporter_only_when_enabled() {
    let mut config = AppConfig::default();
    config.observability.metrics_address = "not an address".to_string();
    assert!(!start_metrics(&config.observability).unwrap());

    config.observability.metrics_enabled = true;
    assert!(matches!(
        start_metrics(&config.observability),
        Err(StartupError::MetricsAddress(_))
    ));
}
