//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn an upstream response into a client response
//! - Strip hop-by-hop headers from the upstream
//! - Build the relay's own plain-text responses
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Upstream status and remaining headers pass through untouched
//! - CORS headers are not set here; the overlay middleware owns them

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::security::headers::strip_hop_by_hop;

/// Body of every GET response.
pub const STATUS_BANNER: &str =
    "gemini-relay is up. POST Gemini API requests here and they are forwarded upstream.";

/// A `text/plain` response with the given status.
pub fn plain_text(status: StatusCode, body: impl Into<String>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
        body.into(),
    )
        .into_response()
}

/// Wrap an upstream response, streaming its body through.
pub fn relay_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_by_hop(&mut headers);

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
