//! Response handling.
//!
//! # Responsibilities
//! - Convert a handler [`Reply`] into an axum response
//! - Map unhandled and halted-without-reply requests to status codes
//!
//! # Design Decisions
//! - No reply after every layer fell through → 404
//! - A chain that halted without writing a reply → 500

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::routing::{Flow, Reply};

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        response
    }
}

/// Final response for a dispatched request.
pub fn finish(flow: Flow, reply: Option<Reply>) -> Response {
    match (reply, flow) {
        (Some(reply), _) => reply.into_response(),
        (None, Flow::Halt) => {
            tracing::warn!("Handler halted without writing a reply");
            (StatusCode::INTERNAL_SERVER_ERROR, "Handler produced no response").into_response()
        }
        (None, _) => (StatusCode::NOT_FOUND, "No matching route found").into_response(),
    }
}
