//! Route compiler server.
//!
//! # Architecture Overview
//!
//! ```text
//!   routes.json / routes.toml
//!            │
//!            ▼
//!   ┌────────────────┐   ┌──────────────┐   ┌────────────────┐
//!   │ spec (parse)   │──▶│  compiler    │──▶│ routing::Router│
//!   └────────────────┘   │  + Registry  │   └───────┬────────┘
//!                        └──────────────┘           │
//!   Client ──▶ http::HttpServer (axum) ──dispatch───┘
//! ```
//!
//! `serve` compiles the configured specification and serves it;
//! `routes` prints the compiled binding table and exits.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use route_compiler::config::{load_config, AppConfig};
use route_compiler::http::HttpServer;
use route_compiler::lifecycle::{prepare, signals, start_metrics, Shutdown};
use route_compiler::observability::logging;

#[derive(Parser)]
#[command(name = "route-compiler", version, about = "Compile and serve declarative route specifications")]
struct Cli {
    /// Configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Compile the specification and serve it (default).
    Serve,
    /// Print the compiled mounts, routes and parameter loaders.
    Routes,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    logging::init(&config.observability.log_filter);

    tracing::info!("route-compiler v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Routes => print_routes(config),
    }
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    start_metrics(&config.observability)?;

    let app = prepare(config)?;
    tracing::info!(
        bind_address = %app.config.listener.bind_address,
        bindings = app.bindings,
        request_timeout_secs = app.config.timeouts.request_secs,
        "Routes compiled"
    );

    let listener = TcpListener::bind(&app.config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&app.config, app.router.clone(), app.views.clone());
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::shutdown_on_signal(&shutdown).await;
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_routes(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = prepare(config)?;

    for mount in app.router.mounts() {
        println!("USE    {} ({} handlers)", mount.path, mount.handlers.len());
    }
    for route in app.router.routes() {
        println!("{:<6} {} [{}]", route.verb, route.path, route.labels().join(", "));
    }
    for name in app.router.param_names() {
        println!("PARAM  :{name}");
    }
    Ok(())
}
