//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum router that hands every request to the compiled [`Router`]
//! - Wire up middleware (request id, tracing, timeout)
//! - Bind server to listener and stop on the shutdown signal
//! - Record request metrics

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router as AxumRouter,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::request::into_context;
use crate::http::response::finish;
use crate::observability::metrics;
use crate::routing::Router;
use crate::views::ViewEngine;

/// Application state injected into the dispatch handler.
#[derive(Clone)]
struct AppState {
    router: Arc<Router>,
    views: Arc<dyn ViewEngine>,
    max_body_bytes: usize,
}

/// Serves a compiled [`Router`] over HTTP.
pub struct HttpServer {
    app: AxumRouter,
}

impl HttpServer {
    pub fn new(config: &AppConfig, router: Arc<Router>, views: Arc<dyn ViewEngine>) -> Self {
        let state = AppState {
            router,
            views,
            max_body_bytes: config.listener.max_body_bytes,
        };
        Self {
            app: Self::build_router(config, state),
        }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> AxumRouter {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        AxumRouter::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(middleware)
    }

    /// The axum router, for embedding or driving in tests.
    pub fn into_router(self) -> AxumRouter {
        self.app
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Every request lands here and is dispatched through the compiled router.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let mut ctx = match into_context(request, state.max_body_bytes, state.views.clone()).await {
        Ok(ctx) => ctx,
        Err(err) => {
            metrics::record_request(&method, err.status().as_u16(), start);
            return err.into_response();
        }
    };

    tracing::debug!(
        request_id = ctx.request_id().unwrap_or("unknown"),
        method = %method,
        path = ctx.path(),
        "Dispatching request"
    );

    let flow = state.router.dispatch(&mut ctx).await;
    let reply = ctx.take_reply();
    if reply.is_none() {
        tracing::debug!(path = ctx.path(), flow = ?flow, "No handler replied");
    }

    let response = finish(flow, reply);
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
