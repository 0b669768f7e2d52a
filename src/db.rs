use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    Connection,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL
)
"#;

/// Opens the SQLite file behind `database_url`, creating it if missing.
///
/// In-memory databases live and die with a single connection, so the pool
/// is pinned to one connection that is never recycled.
pub async fn create_pool(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid database URL {database_url}"))?
        .create_if_missing(true);

    let pool_options = if is_in_memory(database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
    };

    pool_options
        .connect_with(options)
        .await
        .context("Failed to connect to DB")
}

/// True for `sqlite::memory:` and for any URL carrying `mode=memory`.
fn is_in_memory(database_url: &str) -> bool {
    let url = database_url.trim_start_matches("sqlite:");
    let (path, params) = url.split_once('?').unwrap_or((url, ""));

    path.trim_start_matches("//") == ":memory:"
        || params.split('&').any(|param| param == "mode=memory")
}

/// Creates the `users` table when it does not exist yet.
pub async fn create_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(SCHEMA)
        .execute(pool)
        .await
        .context("Failed to create users table")?;
    Ok(())
}

/// Liveness check against the storage handle.
pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;
    conn.ping().await
}
