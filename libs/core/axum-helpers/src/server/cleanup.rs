//! Connection cleanup run after the server stops accepting requests.

use tracing::{error, info};

/// Close a SeaORM connection pool, logging the outcome.
///
/// # Example
/// ```ignore
/// use axum_helpers::server::close_postgres;
///
/// close_postgres(db, "products").await;
/// ```
pub async fn close_postgres(db: sea_orm::DatabaseConnection, name: &str) {
    match db.close().await {
        Ok(_) => info!("PostgreSQL connection '{}' closed successfully", name),
        Err(e) => error!("Error closing PostgreSQL connection '{}': {}", name, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_close_postgres_consumes_mock_connection() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        close_postgres(db, "products").await;
    }
}
