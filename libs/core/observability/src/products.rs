//! Product write metrics.

use metrics::counter;

/// Product metrics recorder
pub struct ProductMetrics;

impl ProductMetrics {
    pub fn record_created(category_id: i32) {
        counter!(
            "products_created_total",
            "category_id" => category_id.to_string()
        )
        .increment(1);
    }

    pub fn record_updated(category_id: i32) {
        counter!(
            "products_updated_total",
            "category_id" => category_id.to_string()
        )
        .increment(1);
    }

    pub fn record_deleted() {
        counter!("products_deleted_total").increment(1);
    }

    /// A write rejected before anything was staged
    pub fn record_validation_failure(field: &'static str) {
        counter!("product_validation_failures_total", "field" => field).increment(1);

        tracing::debug!(field, "Product validation failure recorded");
    }
}
