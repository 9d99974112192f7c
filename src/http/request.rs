//! Request intake.
//!
//! # Responsibilities
//! - Buffer the request body up to the configured limit
//! - Build the [`RequestContext`] handlers run against
//!
//! # Design Decisions
//! - The request id is assigned by the tower-http layer before this runs,
//!   so every context carries one
//! - Oversized bodies are rejected before any handler sees the request

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderName, Request, StatusCode};

use crate::http::error::HttpError;
use crate::routing::RequestContext;
use crate::views::ViewEngine;

/// Header carrying the request id in both directions.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Buffer `request` and wrap it in a [`RequestContext`].
pub async fn into_context(
    request: Request<Body>,
    max_body_bytes: usize,
    views: Arc<dyn ViewEngine>,
) -> Result<RequestContext, HttpError> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, max_body_bytes).await.map_err(|e| {
        tracing::debug!(error = %e, limit = max_body_bytes, "Request body rejected");
        HttpError::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    })?;

    Ok(RequestContext::from_parts(parts, bytes, views))
}
