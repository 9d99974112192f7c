//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use route_compiler::config::AppConfig;
use route_compiler::controller::{ActionResult, Controller, Registry};
use route_compiler::http::HttpServer;
use route_compiler::lifecycle::Shutdown;
use route_compiler::routing::{labeled_handler, Flow, Handler, RequestContext, Router};
use route_compiler::views::ViewEngine;
use tokio::net::TcpListener;

/// Handler that appends `tag` to the `trail` property and continues.
pub fn mark(tag: &'static str) -> Handler {
    labeled_handler(tag, move |ctx| {
        let mut trail = ctx
            .property("trail")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        if !trail.is_empty() {
            trail.push(',');
        }
        trail.push_str(tag);
        ctx.set_property("trail", trail);
        Flow::Next
    })
}

/// Handler that replies `200 body` and stops.
pub fn reply(tag: &'static str, body: &'static str) -> Handler {
    labeled_handler(tag, move |ctx| {
        ctx.send(StatusCode::OK, body);
        Flow::Halt
    })
}

/// Controller action returning a single handler.
pub fn action_of(handler: Handler) -> impl Fn() -> ActionResult + Send + Sync + 'static {
    move || ActionResult::handler(handler.clone())
}

/// Registry with a `Foo` controller (`list`, `show`) and `auth`/`audit` middleware.
pub fn registry() -> Registry {
    Registry::new()
        .with_controller(
            "Foo",
            Controller::new()
                .action("list", action_of(reply("list", "foo list")))
                .action("show", action_of(reply("show", "foo show"))),
        )
        .with_middleware("auth", mark("auth"))
        .with_middleware("audit", mark("audit"))
}

/// Dispatch `method uri` through `router`, returning the flow and context.
pub async fn dispatch(router: &Router, method: Method, uri: &str) -> (Flow, RequestContext) {
    let mut ctx = RequestContext::new(method, uri);
    let flow = router.dispatch(&mut ctx).await;
    (flow, ctx)
}

/// Serve `router` on an ephemeral port. Returns the bound address and the shutdown handle.
pub async fn start_server(router: Router, views: Arc<dyn ViewEngine>) -> (SocketAddr, Shutdown) {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.listener.max_body_bytes = 4096;

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, Arc::new(router), views);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// HTTP client that never pools or proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
