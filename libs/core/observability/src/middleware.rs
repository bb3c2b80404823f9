//! Request metrics for the axum stack.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Request, Response, StatusCode},
    middleware::Next,
};
use metrics::{counter, gauge, histogram};
use std::time::Instant;

/// Label used when no route matched (404 fallback, scans of unknown paths)
const UNMATCHED: &str = "unmatched";

/// Records, per request:
/// - `http_requests_total{method, path, status, status_class}`
/// - `http_request_duration_seconds{method, path}`
/// - `http_requests_errors_total{method, path, status}` for 4xx/5xx
/// - `http_requests_in_flight` while the handler runs
///
/// `path` is the matched route template (`/api/products/{id}`), never the raw
/// URI.
///
/// ```rust,ignore
/// let app = router.layer(axum::middleware::from_fn(observability::metrics_middleware));
/// ```
pub async fn metrics_middleware(
    matched_path: Option<MatchedPath>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let method = request.method().as_str().to_owned();
    let path = matched_path
        .as_ref()
        .map_or(UNMATCHED, MatchedPath::as_str)
        .to_owned();

    let in_flight = gauge!("http_requests_in_flight");
    in_flight.increment(1.0);
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed = start.elapsed().as_secs_f64();
    in_flight.decrement(1.0);

    let status = response.status();
    let code = status.as_str().to_owned();

    histogram!(
        "http_request_duration_seconds",
        "method" => method.clone(),
        "path" => path.clone()
    )
    .record(elapsed);

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => code.clone(),
        "status_class" => status_class(status)
    )
    .increment(1);

    if status.is_client_error() || status.is_server_error() {
        counter!(
            "http_requests_errors_total",
            "method" => method,
            "path" => path,
            "status" => code
        )
        .increment(1);
    }

    response
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() / 100 {
        1 => "1xx",
        2 => "2xx",
        3 => "3xx",
        4 => "4xx",
        5 => "5xx",
        _ => "other",
    }
}
