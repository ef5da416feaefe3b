use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Interview traffic is low-volume and bursty (operation polling plus short
/// CRUD requests), so a small pool is enough. Spawned operation tasks share
/// this pool with the request handlers.
const MAX_CONNECTIONS: u32 = 5;

/// Creates the PostgreSQL connection pool shared across the service.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(database_url)
        .await?;

    info!("Database pool ready (max {MAX_CONNECTIONS} connections)");
    Ok(pool)
}
