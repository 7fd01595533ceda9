//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by method, status, upstream
//! - `relay_request_duration_seconds` (histogram): time until response
//!   headers are ready; streamed bodies continue afterwards
//!
//! Nothing is exported unless `init_metrics` installs the Prometheus
//! recorder; until then the macros are no-ops.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "relay_requests_total";
pub const REQUEST_DURATION: &str = "relay_request_duration_seconds";

/// Upstream latency buckets; streamed generations run long.
const LATENCY_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

/// Install the Prometheus recorder with an HTTP listener on `addr`.
/// Requires a running Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets(LATENCY_BUCKETS)?
        .install()?;

    describe_counter!(REQUESTS_TOTAL, "Requests handled by the relay");
    describe_histogram!(REQUEST_DURATION, "Seconds until the response head was ready");

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one handled request.
pub fn record_request(method: &str, status: u16, upstream: &'static str, start: Instant) {
    counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status.to_string(),
        "upstream" => upstream
    )
    .increment(1);
    histogram!(REQUEST_DURATION, "upstream" => upstream).record(start.elapsed().as_secs_f64());
}
