//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the single relay handler
//! - Wire up middleware (tracing, request ID, CORS overlay)
//! - Dispatch by method: OPTIONS, GET, POST, everything else
//! - Forward POST requests to the resolved upstream
//! - Observability (metrics, request IDs)

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ProxyConfig, UpstreamConfig};
use crate::http::error::{RelayError, ServerError};
use crate::http::request::{request_id, upstream_request, RelayRequestId, X_REQUEST_ID};
use crate::http::response::{plain_text, relay_response, STATUS_BANNER};
use crate::observability::metrics;
use crate::routing::UpstreamRouter;
use crate::security::{cors_overlay, CorsHeaders};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<UpstreamRouter>,
    pub client: reqwest::Client,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let upstream_router = Arc::new(UpstreamRouter::from_config(&config.upstream));
        let client = build_client(&config.upstream)?;
        let cors = Arc::new(CorsHeaders::from_config(&config.cors));

        tracing::info!(
            mode = ?upstream_router.mode(),
            keys = upstream_router.key_pool().len(),
            local_route = config.upstream.local_base_url.is_some(),
            "Upstream router ready"
        );

        let state = AppState {
            router: upstream_router,
            client,
        };

        let router = Self::build_router(state, cors);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The CORS overlay is the outermost layer, so every response passes
    /// through it last.
    fn build_router(state: AppState, cors: Arc<CorsHeaders>) -> Router {
        Router::new()
            .route("/", any(relay_handler))
            .route("/{*path}", any(relay_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, RelayRequestId))
            .layer(middleware::from_fn_with_state(cors, cors_overlay))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for driving requests in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

fn build_client(config: &UpstreamConfig) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects));

    if let Some(secs) = config.connect_timeout_secs {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }
    if !config.use_env_proxy {
        builder = builder.no_proxy();
    }

    builder.build()
}

/// Main relay handler.
/// Dispatches on method; only POST contacts an upstream.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();

    let (response, upstream) = match method {
        Method::OPTIONS => (StatusCode::NO_CONTENT.into_response(), "none"),
        Method::GET => (plain_text(StatusCode::OK, STATUS_BANNER), "none"),
        Method::POST => forward(&state, request).await,
        _ => {
            tracing::debug!(method = %method, "Rejecting method");
            (RelayError::MethodNotAllowed(method.clone()).into_response(), "none")
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), upstream, start_time);
    response
}

/// Resolve the route and forward. Every failure becomes a response.
async fn forward(state: &AppState, request: Request<Body>) -> (Response, &'static str) {
    let route = match state.router.resolve(request.headers()) {
        Ok(route) => route,
        Err(e) => {
            tracing::error!(error = %e, "Cannot resolve upstream");
            return (e.into_response(), "none");
        }
    };
    let upstream = route.upstream.as_str();

    tracing::debug!(
        upstream,
        base_url = %route.base_url,
        key_index = ?route.query_key.map(|(index, _)| index),
        "Proxying request"
    );

    let outbound = match upstream_request(&state.client, &route, request) {
        Ok(builder) => builder,
        Err(e) => {
            tracing::error!(upstream, error = %e, "Cannot build upstream request");
            return (e.into_response(), upstream);
        }
    };

    match outbound.send().await {
        Ok(response) => {
            tracing::debug!(upstream, status = %response.status(), "Upstream responded");
            (relay_response(response), upstream)
        }
        Err(e) => {
            let error = RelayError::from(e);
            tracing::error!(upstream, error = %error, "Upstream error");
            (error.into_response(), upstream)
        }
    }
}
