//! # EMSU DB
//!
//! SQLite connection pool for the EMSU API.
//!
//! The database file is created on first connect and every connection runs
//! with `PRAGMA foreign_keys = ON` so relation columns are enforced by the
//! store.
//!
//! # Example
//!
//! ```ignore
//! use emsu_db::init_db_pool;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sqlx::Error> {
//!     let pool = init_db_pool().await?;
//!     sqlx::migrate!("./migrations").run(&pool).await?;
//!     Ok(())
//! }
//! ```

use std::{env, str::FromStr, time::Duration};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub use sqlx::SqlitePool;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://emsu.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connects using `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS`.
///
/// Should be called once during startup; the returned pool is cheaply
/// cloneable and lives in the application state.
pub async fn init_db_pool() -> Result<SqlitePool, sqlx::Error> {
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n: &u32| *n > 0)
        .unwrap_or(DEFAULT_MAX_CONNECTIONS);

    connect_pool(&database_url, max_connections).await
}

/// Builds a pool for an explicit URL.
pub async fn connect_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(max_connections, "Database pool ready");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_in_memory_enables_foreign_keys() {
        let pool = connect_pool("sqlite::memory:", 1).await.unwrap();
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_pool_respects_max_connections() {
        let pool = connect_pool("sqlite::memory:", 3).await.unwrap();
        assert_eq!(pool.options().get_max_connections(), 3);
    }
}
