//! Database connection pool using OnceCell pattern.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;

use crate::error::Result;
use crate::settings::{self, Settings};

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Open a pool for the configured database.
/// A `DATABASE_URL` environment variable (or `.env` entry) overrides the settings.
pub async fn connect(database: &settings::Database) -> Result<PgPool> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| database.url());

    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .connect(&database_url)
        .await?;
    tracing::info!(max_connections = database.max_connections, "database pool ready");
    Ok(pool)
}

async fn init_pool() -> Result<PgPool> {
    let settings = Settings::new()?;
    connect(&settings.database).await
}

/// Get or initialize the process-wide pool from [`Settings::new`].
pub async fn get_pool() -> Result<&'static PgPool> {
    POOL.get_or_try_init(init_pool).await
}

/// Apply the bundled schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}
