//! Database migrations
//!
//! Code-based migrations for the Atrium backend. All migrations are embedded
//! as SQL strings for single-binary deployment. Each migration has a unique
//! version; applied versions are recorded in the `_migrations` ledger table
//! and skipped on subsequent runs.

use anyhow::{Context, Result};
use sqlx::Row;

use super::DbPool;

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements applied by this migration
    pub up: &'static str,
}

/// All migrations for the Atrium backend
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_admins",
        up: r#"
            CREATE TABLE IF NOT EXISTS admins (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                email VARCHAR(255) NOT NULL,
                password_hash VARCHAR(255) NOT NULL,
                refresh_token_hash VARCHAR(255),
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_admins_username ON admins(username);
        "#,
    },
    Migration {
        version: 2,
        name: "create_blogs",
        up: r#"
            CREATE TABLE IF NOT EXISTS blogs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(255) NOT NULL,
                slug VARCHAR(255) NOT NULL UNIQUE,
                content TEXT NOT NULL,
                author_id INTEGER NOT NULL,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL,
                FOREIGN KEY (author_id) REFERENCES admins(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_blogs_slug ON blogs(slug);
            CREATE INDEX IF NOT EXISTS idx_blogs_author_id ON blogs(author_id);
        "#,
    },
    Migration {
        version: 3,
        name: "create_media",
        up: r#"
            CREATE TABLE IF NOT EXISTS media (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(255) NOT NULL UNIQUE,
                slug VARCHAR(255) NOT NULL UNIQUE,
                url TEXT NOT NULL,
                size VARCHAR(50) NOT NULL,
                uploader_id INTEGER NOT NULL,
                uploaded_at TIMESTAMP NOT NULL,
                FOREIGN KEY (uploader_id) REFERENCES admins(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_media_slug ON media(slug);
            CREATE INDEX IF NOT EXISTS idx_media_uploaded_at ON media(uploaded_at);
        "#,
    },
    Migration {
        version: 4,
        name: "create_contact_messages",
        up: r#"
            CREATE TABLE IF NOT EXISTS contact_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                full_name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL,
                phone_number VARCHAR(50) NOT NULL,
                message TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_contact_messages_created_at
                ON contact_messages(created_at);
        "#,
    },
    Migration {
        version: 5,
        name: "create_businesses",
        up: r#"
            CREATE TABLE IF NOT EXISTS businesses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(255) NOT NULL,
                slug VARCHAR(255) NOT NULL UNIQUE,
                description TEXT NOT NULL,
                image_header_url TEXT,
                product_header_url TEXT,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_businesses_slug ON businesses(slug);
        "#,
    },
    Migration {
        version: 6,
        name: "create_business_items",
        up: r#"
            CREATE TABLE IF NOT EXISTS business_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind VARCHAR(20) NOT NULL,
                title VARCHAR(255) NOT NULL,
                slug VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                media_urls TEXT NOT NULL DEFAULT '[]',
                business_id INTEGER NOT NULL,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL,
                UNIQUE (kind, slug),
                FOREIGN KEY (business_id) REFERENCES businesses(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_business_items_business_id
                ON business_items(business_id);
            CREATE INDEX IF NOT EXISTS idx_business_items_kind ON business_items(kind);
        "#,
    },
    Migration {
        version: 7,
        name: "create_documents",
        up: r#"
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(255) NOT NULL,
                slug VARCHAR(255) NOT NULL UNIQUE,
                category VARCHAR(50) NOT NULL,
                url TEXT NOT NULL,
                size VARCHAR(50) NOT NULL,
                uploader_id INTEGER NOT NULL,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL,
                FOREIGN KEY (uploader_id) REFERENCES admins(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_documents_slug ON documents(slug);
            CREATE INDEX IF NOT EXISTS idx_documents_category ON documents(category);
        "#,
    },
];

/// Run all pending migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    create_migrations_table(pool).await?;

    let applied = applied_versions(pool).await?;

    for migration in MIGRATIONS {
        if applied.contains(&(migration.version as i64)) {
            continue;
        }

        tracing::info!(
            "Applying migration {} ({})",
            migration.version,
            migration.name
        );

        // SQLite cannot run multiple statements in one prepared query, so
        // split on semicolons.
        for statement in migration.up.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            sqlx::query(statement).execute(pool).await.with_context(|| {
                format!(
                    "Failed to apply migration {} ({})",
                    migration.version, migration.name
                )
            })?;
        }

        sqlx::query("INSERT INTO _migrations (version, name, applied_at) VALUES (?, ?, ?)")
            .bind(migration.version as i64)
            .bind(migration.name)
            .bind(chrono::Utc::now())
            .execute(pool)
            .await
            .context("Failed to record migration")?;
    }

    Ok(())
}

async fn create_migrations_table(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            applied_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create migrations table")?;
    Ok(())
}

async fn applied_versions(pool: &DbPool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;
    rows.iter().map(|r| r.try_get(0).map_err(Into::into)).collect()
}
