//! Products API - REST server over PostgreSQL

use axum::middleware;
use axum_helpers::server::{close_postgres, create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use migration::Migrator;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);
    observability::init_metrics()?;

    info!("Connecting to PostgreSQL");
    let db =
        database::postgres::connect_from_config_with_retry(config.database.clone(), None).await?;

    if config.run_migrations {
        database::postgres::run_migrations::<Migrator>(&db, config.app.name).await?;
    } else {
        info!("Skipping migrations (RUN_MIGRATIONS=false)");
    }

    let state = AppState {
        config: config.clone(),
        db,
    };

    // /api/products plus the docs UIs and fallbacks
    let router = create_router::<openapi::ApiDoc>(api::routes(&state)).await?;

    // - /health: liveness
    // - /ready: readiness with a database round-trip
    // - /metrics: Prometheus scrape
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()))
        .merge(api::metrics_router())
        .layer(middleware::from_fn(observability::metrics_middleware));

    info!(
        "Starting {} v{} on {}",
        state.config.app.name,
        state.config.app.version,
        state.config.server.address()
    );

    let db = state.db.clone();
    create_production_app(app, &state.config.server, async move {
        close_postgres(db, "products").await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Products API shutdown complete");
    Ok(())
}
