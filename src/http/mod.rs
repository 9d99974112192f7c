//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, request id, trace, timeout)
//!     → request.rs (buffer body, build RequestContext)
//!     → routing::Router::dispatch (compiled specification)
//!     → response.rs (Reply → response, 404 / 500 fallbacks)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::HttpError;
pub use request::X_REQUEST_ID;
pub use response::finish;
pub use server::HttpServer;
