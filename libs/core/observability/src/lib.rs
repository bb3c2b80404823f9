//! Observability utilities for the products service.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Product write counters recorded by the products domain
//! - Axum middleware for automatic request metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{ProductMetrics, init_metrics, metrics_handler};
//!
//! init_metrics()?;
//!
//! ProductMetrics::record_created(3);
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod middleware;
pub mod products;

pub use middleware::metrics_middleware;
pub use products::ProductMetrics;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder once per process.
///
/// Later calls return the handle installed by the first one.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();
        Ok(handle)
    })
}

/// Get the metrics handle (`None` until [`init_metrics`] succeeded)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_gauge!("http_requests_in_flight", "HTTP requests currently being handled");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    describe_counter!("products_created_total", "Products created, by category");
    describe_counter!("products_updated_total", "Products updated, by category");
    describe_counter!("products_deleted_total", "Products deleted");
    describe_counter!(
        "product_validation_failures_total",
        "Product writes rejected by validation, by field"
    );
}
