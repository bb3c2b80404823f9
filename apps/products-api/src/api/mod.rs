use axum::{Router, routing::get};
use domain_products::{PgContextFactory, handlers};

pub mod health;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
///
/// Returns a stateless Router; every request gets its own database context
/// from the factory.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new().nest(
        "/products",
        handlers::router(PgContextFactory::new(state.db.clone())),
    )
}

/// Creates a router with the /ready endpoint that performs actual health checks.
///
/// This router has state applied and can be merged with the stateless app router
/// from `create_router`.
pub fn ready_router(state: crate::state::AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

/// Prometheus scrape endpoint
pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(observability::metrics_handler))
}
