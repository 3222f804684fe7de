//! SQLite pool construction for the leads database.
//!
//! The workload is read-mostly: every turn issues a handful of validated
//! `SELECT`s, and writes only happen through migrations and seeding. WAL
//! with `synchronous = NORMAL` fits that profile; the busy timeout covers
//! a concurrent CLI invocation holding the write lock.

use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use leadwise_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(Duration::from_secs(config.timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA synchronous = NORMAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await
}

/// Pool settings for an in-memory test database: one connection, short
/// acquire timeout.
#[cfg(test)]
pub(crate) fn memory_config() -> DatabaseConfig {
    DatabaseConfig { url: "sqlite::memory:".to_string(), max_connections: 1, timeout_secs: 5 }
}
