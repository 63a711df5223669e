//! Request handling.
//!
//! # Responsibilities
//! - Request ID generation and propagation (`x-request-id`, UUID v4)
//! - Per-request tracing span carrying the request ID
//! - Request payloads accepted by the API

use axum::body::Body;
use axum::http::Request;
use serde::{Deserialize, Serialize};
use tracing::Span;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Span for one HTTP request; the ID is set by `SetRequestIdLayer` upstream.
pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Body of `POST /conf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConfigRequest {
    pub name: String,
    /// Base64 of the initial content.
    pub content: String,
}

/// Body of `PUT /conf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    pub name: String,
    /// Base64 of the content the client started editing from.
    pub current_content: String,
    /// Base64 of the content to store.
    pub expected_content: String,
}
