use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;

pub type DbPool = Pool<Postgres>;

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    pool_options().connect(database_url).await
}

/// Pool that only connects on first use; start-up does not wait for the database.
pub fn create_lazy_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    pool_options().connect_lazy(database_url)
}

pub async fn check_connection(pool: &DbPool) -> Result<bool, sqlx::Error> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map(|_| true)
}
