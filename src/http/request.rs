//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Build the upstream target URL from base, path, and query
//! - Build outbound headers per the route's header policy
//! - Hand the inbound body to the upstream client as a stream
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The body is never collected; it flows chunk by chunk
//! - Path and query are appended verbatim; only `key` is rewritten

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, Request, Uri},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::Url;

use crate::http::error::RelayError;
use crate::routing::{HeaderPolicy, ResolvedRoute};
use crate::security::headers;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Query parameter carrying the injected API key.
pub const KEY_PARAM: &str = "key";

/// Generates `x-request-id` values for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelayRequestId;

impl MakeRequestId for RelayRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Read the request ID set by the request-id layer.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// `base` + original path + original query, with `key` set when given.
///
/// Any `key` already present in the query is replaced so the upstream sees
/// exactly one.
pub fn build_target_url(base: &str, uri: &Uri, key: Option<&str>) -> Result<Url, RelayError> {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let raw = format!("{base}{path_and_query}");
    let mut url = Url::parse(&raw).map_err(|source| RelayError::InvalidTarget {
        url: raw.clone(),
        source,
    })?;

    if let Some(key) = key {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(name, _)| name != KEY_PARAM)
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(KEY_PARAM, key);
    }

    Ok(url)
}

/// Outbound headers for a route.
pub fn outbound_headers(policy: HeaderPolicy, inbound: &HeaderMap) -> HeaderMap {
    match policy {
        HeaderPolicy::JsonOnly => headers::json_only(),
        HeaderPolicy::ForwardSanitized => headers::sanitize_forwarded(inbound),
    }
}

/// Turn an inbound request into an upstream request on `client`.
pub fn upstream_request(
    client: &reqwest::Client,
    route: &ResolvedRoute<'_>,
    request: Request<Body>,
) -> Result<reqwest::RequestBuilder, RelayError> {
    let (parts, body) = request.into_parts();
    let target = build_target_url(route.base_url, &parts.uri, route.query_key.map(|(_, k)| k))?;
    let headers = outbound_headers(route.header_policy, &parts.headers);

    Ok(client
        .request(parts.method, target)
        .headers(headers)
        .body(reqwest::Body::wrap_stream(body.into_data_stream())))
}
