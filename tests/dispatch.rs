//! Request-time behaviour of compiled specifications.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use route_compiler::compiler::SpecificationCompiler;
use route_compiler::controller::{gate_fn, sync_gate, ActionResult, Controller, GateFailure, Guarded, Registry};
use route_compiler::http::HttpError;
use route_compiler::routing::{param_fn, sync_handler, sync_param, Flow, RequestContext, Router};
use route_compiler::spec::{self, ParamSpec, SpecMap, SpecNode, VerbSpec};
use route_compiler::views::TemplateViews;
use serde_json::json;

mod common;

use common::{dispatch, mark, registry, reply};

fn rejecting(failure: fn() -> GateFailure) -> Controller {
    Controller::new().action("submit", move || {
        Guarded::new(reply("execute", "accepted"))
            .validate(sync_gate(move |_| Err(failure())))
            .into()
    })
}

fn compile(registry: &Registry, spec: SpecNode) -> Router {
    SpecificationCompiler::new(registry).build_router(&spec, "/").unwrap()
}

#[tokio::test]
async fn test_gate_failure_falls_through_to_next_route() {
    let registry = registry()
        .with_controller("Strict", rejecting(|| "name is required".into()))
        .with_controller("Lenient", Controller::new().action("submit", common::action_of(reply("lenient", "fallback"))));

    let spec = SpecMap::new()
        .post(VerbSpec::action("Strict@submit"))
        .post(VerbSpec::action("Lenient@submit"))
        .into();
    let router = compile(&registry, spec);

    let (flow, ctx) = dispatch(&router, Method::POST, "/").await;
    assert_eq!(flow, Flow::Halt);
    let reply = ctx.reply().unwrap();
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.text(), "fallback");
}

#[tokio::test]
async fn test_async_gate_failure_falls_through() {
    let slow = Controller::new().action("submit", || {
        Guarded::new(reply("execute", "accepted"))
            .validate(gate_fn(|ctx| {
                Box::pin(async move {
                    tokio::task::yield_now().await;
                    ctx.set_property("checked", true);
                    let outcome: Result<(), GateFailure> = Err("quota exceeded".into());
                    outcome
                })
            }))
            .into()
    });
    let registry = registry()
        .with_controller("Slow", slow)
        .with_controller("Lenient", Controller::new().action("submit", common::action_of(reply("lenient", "fallback"))));

    let spec = SpecMap::new()
        .post(VerbSpec::action("Slow@submit"))
        .post(VerbSpec::action("Lenient@submit"))
        .into();
    let router = compile(&registry, spec);

    let (flow, ctx) = dispatch(&router, Method::POST, "/").await;
    assert_eq!(flow, Flow::Halt);
    assert_eq!(ctx.property("checked"), Some(&json!(true)));
    assert_eq!(ctx.reply().unwrap().status, StatusCode::OK);
    assert_eq!(ctx.reply().unwrap().text(), "fallback");
}

#[tokio::test]
async fn test_gate_failure_without_fallback_keeps_error_reply() {
    let registry = registry().with_controller("Strict", rejecting(|| HttpError::unauthorized("login first").into()));
    let router = compile(&registry, SpecMap::new().post(VerbSpec::action("Strict@submit")).into());

    let (flow, ctx) = dispatch(&router, Method::POST, "/").await;
    assert_eq!(flow, Flow::Next);
    let reply = ctx.reply().unwrap();
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.text(), "login first");
}

#[tokio::test]
async fn test_passing_gates_reach_execute() {
    let registry = registry().with_controller(
        "Form",
        Controller::new().action("submit", || {
            Guarded::new(sync_handler(|ctx| {
                let cleaned = ctx.property("cleaned").cloned().unwrap_or_default();
                ctx.json(StatusCode::OK, &cleaned);
                Flow::Halt
            }))
            .validate(sync_gate(|ctx| {
                ctx.body_json::<serde_json::Value>()
                    .map(|_| ())
                    .map_err(|e| GateFailure::Message(e.to_string()))
            }))
            .sanitize(sync_gate(|ctx| {
                ctx.set_property("cleaned", true);
                Ok(())
            }))
            .into()
        }),
    );
    let router = compile(&registry, SpecMap::new().post(VerbSpec::action("Form@submit")).into());

    let mut ctx = RequestContext::new(Method::POST, "/").with_body(r#"{"a":1}"#);
    assert_eq!(router.dispatch(&mut ctx).await, Flow::Halt);
    assert_eq!(ctx.reply().unwrap().text(), "true");

    let mut ctx = RequestContext::new(Method::POST, "/").with_body("not json");
    router.dispatch(&mut ctx).await;
    assert_eq!(ctx.reply().unwrap().status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_before_action_after_run_in_order() {
    let registry = registry().with_controller(
        "Echo",
        Controller::new().action("trail", || {
            ActionResult::Handlers(vec![mark("action"), sync_handler(|ctx| {
                let trail = ctx.property("trail").cloned().unwrap_or_default();
                ctx.json(StatusCode::OK, &trail);
                Flow::Next
            })])
        }),
    );
    let spec = spec::parse(&json!({
        "get": {"action": "Echo@trail", "before": ["auth"], "after": "audit"}
    }))
    .unwrap();
    let router = compile(&registry, spec);

    let (_, ctx) = dispatch(&router, Method::GET, "/").await;
    assert_eq!(ctx.property("trail").unwrap(), "auth,action,audit");
    assert_eq!(ctx.reply().unwrap().text(), r#""auth,action""#);
}

#[tokio::test]
async fn test_use_runs_for_every_verb() {
    let spec = spec::parse(&json!({
        "use": "auth",
        "get": {"action": "Foo@list"},
        "post": {"action": "Foo@show"}
    }))
    .unwrap();
    let router = compile(&registry(), spec);

    for (method, body) in [(Method::GET, "foo list"), (Method::POST, "foo show")] {
        let (_, ctx) = dispatch(&router, method, "/").await;
        assert_eq!(ctx.property("trail").unwrap(), "auth");
        assert_eq!(ctx.reply().unwrap().text(), body);
    }
}

#[tokio::test]
async fn test_param_property_and_loader() {
    let registry = registry().with_controller(
        "User",
        Controller::new()
            .action("load", || {
                ActionResult::ParamLoader(sync_param(|ctx, value| {
                    if value == "0" {
                        ctx.send(StatusCode::NOT_FOUND, "no such user");
                        return Flow::Halt;
                    }
                    ctx.set_property("user", json!({"id": value}));
                    Flow::Next
                }))
            })
            .action("show", || {
                ActionResult::handler(sync_handler(|ctx| {
                    let body = json!({
                        "user": ctx.property("user").cloned(),
                        "org": ctx.property("org").cloned(),
                    });
                    ctx.json(StatusCode::OK, &body);
                    Flow::Halt
                }))
            }),
    );

    let spec = SpecMap::new()
        .param("userId", ParamSpec::action("User@load"))
        .param("orgId", ParamSpec::property("org"))
        .path(
            "/orgs/:orgId/users/:userId",
            SpecMap::new().get(VerbSpec::action("User@show")),
        )
        .into();
    let router = compile(&registry, spec);

    let (_, ctx) = dispatch(&router, Method::GET, "/orgs/acme/users/7").await;
    let body: serde_json::Value = serde_json::from_slice(&ctx.reply().unwrap().body).unwrap();
    assert_eq!(body, json!({"user": {"id": "7"}, "org": "acme"}));

    let (flow, ctx) = dispatch(&router, Method::GET, "/orgs/acme/users/0").await;
    assert_eq!(flow, Flow::Halt);
    assert_eq!(ctx.reply().unwrap().status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_async_param_loader() {
    let registry = registry().with_controller(
        "Order",
        Controller::new()
            .action("load", || {
                ActionResult::ParamLoader(param_fn(|ctx, value| {
                    Box::pin(async move {
                        tokio::task::yield_now().await;
                        ctx.set_property("order", format!("order-{value}"));
                        Flow::Next
                    })
                }))
            })
            .action("show", || {
                ActionResult::handler(sync_handler(|ctx| {
                    let body = ctx.property("order").cloned().unwrap_or_default();
                    ctx.json(StatusCode::OK, &body);
                    Flow::Halt
                }))
            }),
    );

    let spec = SpecMap::new()
        .param("orderId", ParamSpec::action("Order@load"))
        .path("/orders/:orderId", SpecMap::new().get(VerbSpec::action("Order@show")))
        .into();
    let router = compile(&registry, spec);

    let (flow, ctx) = dispatch(&router, Method::GET, "/orders/12").await;
    assert_eq!(flow, Flow::Halt);
    assert_eq!(ctx.reply().unwrap().text(), r#""order-12""#);
}

#[tokio::test]
async fn test_view_renders_with_properties() {
    let mut views = TemplateViews::new();
    views.insert("profile", "<h1>{{ trail }}</h1>");

    let spec = spec::parse(&json!({
        "/profile": {"get": {"view": "profile", "before": "auth"}},
        "/audited": {"get": {"view": "profile", "after": "audit"}},
        "/missing": {"get": {"view": "nope"}}
    }))
    .unwrap();
    let router = compile(&registry(), spec);
    let views = Arc::new(views);

    let mut ctx = RequestContext::new(Method::GET, "/profile").with_views(views.clone());
    assert_eq!(router.dispatch(&mut ctx).await, Flow::Halt);
    assert_eq!(ctx.reply().unwrap().text(), "<h1>auth</h1>");

    let mut ctx = RequestContext::new(Method::GET, "/audited").with_views(views.clone());
    router.dispatch(&mut ctx).await;
    assert_eq!(ctx.reply().unwrap().text(), "<h1></h1>");
    assert_eq!(ctx.property("trail").unwrap(), "audit");

    let mut ctx = RequestContext::new(Method::GET, "/missing").with_views(views);
    router.dispatch(&mut ctx).await;
    assert_eq!(ctx.reply().unwrap().status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_embedded_router_sees_relative_paths() {
    let registry = registry();
    let compiler = SpecificationCompiler::new(&registry);
    let v1 = compiler
        .build_router(&spec::parse(&json!({"/foo": {"get": {"action": "Foo@list"}}})).unwrap(), "/")
        .unwrap();

    let app = compiler
        .build_router(&SpecMap::new().path("/v1", v1).into(), "/")
        .unwrap();

    let (flow, ctx) = dispatch(&app, Method::GET, "/v1/foo").await;
    assert_eq!(flow, Flow::Halt);
    assert_eq!(ctx.reply().unwrap().text(), "foo list");
    assert_eq!(ctx.path(), "/v1/foo");

    let (flow, ctx) = dispatch(&app, Method::GET, "/foo").await;
    assert_eq!(flow, Flow::Next);
    assert!(ctx.reply().is_none());
}
