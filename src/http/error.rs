//! Errors surfaced to clients and at server startup.

use std::error::Error as _;

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::http::response::plain_text;

/// Per-request failures. Each maps to a plain-text response.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("No upstream API keys configured: GEMINI_API_KEYS is not set or empty.")]
    NoApiKeys,

    #[error("Invalid upstream URL '{url}': {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Upstream request failed: {}", describe(.0))]
    Upstream(#[source] reqwest::Error),

    #[error("Method {0} Not Allowed")]
    MethodNotAllowed(Method),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::NoApiKeys | RelayError::InvalidTarget { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RelayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

// The URL carries the injected `key` parameter and must not reach clients or logs.
impl From<reqwest::Error> for RelayError {
    fn from(error: reqwest::Error) -> Self {
        RelayError::Upstream(error.without_url())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        plain_text(self.status(), self.to_string())
    }
}

/// The error plus its source chain, e.g.
/// `error sending request: client error (Connect): Connection refused`.
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Failures while building or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("server IO error: {0}")]
    Io(#[from] std::io::Error),
}
