//! Header filtering for outbound requests and relayed responses.
//!
//! # Responsibilities
//! - Strip headers injected by the hosting edge (client IP, worker identity)
//! - Strip connection-level headers the HTTP client regenerates
//! - Strip hop-by-hop headers from upstream responses
//!
//! # Design Decisions
//! - Everything else a client sends is forwarded as-is in keyed routing
//! - Matching is by lowercase name; `HeaderName` is already normalized

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Prefix of headers added by Cloudflare's edge.
const EDGE_HEADER_PREFIX: &str = "cf-";

/// Edge and proxy identification headers without the `cf-` prefix.
pub const EDGE_HEADERS: &[&str] = &[
    "cdn-loop",
    "true-client-ip",
    "x-real-ip",
    "x-forwarded-for",
    "x-forwarded-host",
    "x-forwarded-proto",
    "x-forwarded-port",
    "forwarded",
    "x-request-id",
];

/// Hop-by-hop headers (RFC 9110 section 7.6.1) plus `proxy-connection`.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// True for headers identifying the edge or the client's network position.
pub fn is_edge_header(name: &HeaderName) -> bool {
    let name = name.as_str();
    name.starts_with(EDGE_HEADER_PREFIX) || EDGE_HEADERS.contains(&name)
}

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name.as_str())
}

/// Copy inbound headers for the upstream, dropping edge, hop-by-hop, and
/// framing headers. `Host` and `Content-Length` are recomputed by the client.
pub fn sanitize_forwarded(inbound: &HeaderMap) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if *name == header::HOST
            || *name == header::CONTENT_LENGTH
            || is_hop_by_hop(name)
            || is_edge_header(name)
        {
            continue;
        }
        outbound.append(name.clone(), value.clone());
    }
    outbound
}

/// The header set sent with key-pool requests.
pub fn json_only() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(1);
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Remove hop-by-hop headers from an upstream response in place.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(*name);
    }
}
