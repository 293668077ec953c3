//! Metrics collection and exposition.
//!
//! # Metrics
//! - `urlshort_redirects_total` (counter): redirects issued, by request path
//! - `urlshort_fallbacks_total` (counter): requests handed to a fallback
//!
//! Path labels are bounded by the configured redirect table.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_redirect(path: &str) {
    counter!("urlshort_redirects_total", "path" => path.to_owned()).increment(1);
}

pub fn record_fallback() {
    counter!("urlshort_fallbacks_total").increment(1);
}
