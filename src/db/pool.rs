//! Database connection pool
//!
//! SQLite pool creation for the Atrium backend. File-based databases get
//! their parent directory created on demand so a fresh checkout can start
//! without manual setup.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::DatabaseConfig;

/// Shared database pool type
pub type DbPool = SqlitePool;

/// Create a connection pool from the database configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    connect(&config.url, 20).await
}

/// Create an in-memory pool for tests.
///
/// Capped at one connection: every `:memory:` connection is its own
/// database, so a wider pool would scatter tables across connections.
pub async fn create_test_pool() -> Result<DbPool> {
    connect("sqlite::memory:", 1).await
}

async fn connect(url: &str, max_connections: u32) -> Result<DbPool> {
    // Ensure the database directory exists for file-based SQLite
    if !url.contains(":memory:") {
        let path = url.trim_start_matches("sqlite:");
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {:?}", parent)
                })?;
            }
        }
    }

    let connection_url = if url.starts_with("sqlite:") {
        url.to_string()
    } else if url == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite:{}", url)
    };

    // Connect-time options apply to every pooled connection, unlike a
    // one-off PRAGMA query.
    let options = SqliteConnectOptions::from_str(&connection_url)
        .with_context(|| format!("Invalid SQLite URL: {}", url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_connects_in_memory() {
        let pool = create_test_pool().await.expect("Failed to create pool");
        let one: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("Failed to run query");
        assert_eq!(one, 1);
    }
}
