//! Admin repository
//!
//! Database operations for admin accounts, including the stored
//! refresh-token hash that backs the session lifecycle.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::Admin;

/// Admin repository trait
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Get an admin by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Admin>>;

    /// Get an admin by username
    async fn get_by_username(&self, username: &str) -> Result<Option<Admin>>;

    /// Create a new admin account
    async fn create(&self, username: &str, email: &str, password_hash: &str) -> Result<Admin>;

    /// Store or clear the refresh-token hash for an admin.
    ///
    /// Returns `false` when the admin row no longer exists.
    async fn set_refresh_token_hash(&self, id: i64, hash: Option<&str>) -> Result<bool>;
}

/// SQLx-based admin repository implementation
pub struct SqlxAdminRepository {
    pool: DbPool,
}

impl SqlxAdminRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn AdminRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_ADMIN: &str = "SELECT id, username, email, password_hash, refresh_token_hash, \
     created_at, updated_at FROM admins";

#[async_trait]
impl AdminRepository for SqlxAdminRepository {
    async fn get_by_id(&self, id: i64) -> Result<Option<Admin>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_ADMIN))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch admin by id")?;
        row.map(|r| map_admin(&r)).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Admin>> {
        let row = sqlx::query(&format!("{} WHERE username = ?", SELECT_ADMIN))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch admin by username")?;
        row.map(|r| map_admin(&r)).transpose()
    }

    async fn create(&self, username: &str, email: &str, password_hash: &str) -> Result<Admin> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO admins (username, email, password_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create admin")?;

        Ok(Admin {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn set_refresh_token_hash(&self, id: i64, hash: Option<&str>) -> Result<bool> {
        let result =
            sqlx::query("UPDATE admins SET refresh_token_hash = ?, updated_at = ? WHERE id = ?")
                .bind(hash)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await
                .context("Failed to update refresh-token hash")?;

        Ok(result.rows_affected() > 0)
    }
}

/// Map a database row to an `Admin`
fn map_admin(row: &SqliteRow) -> Result<Admin> {
    Ok(Admin {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        refresh_token_hash: row.try_get("refresh_token_hash")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
