//! Media repository
//!
//! Media names and slugs are unique at the store level. Creation and rename
//! go through `try_*` methods that surface a unique-constraint violation as
//! `Ok(None)` so the service layer can retry with a suffixed name instead of
//! pre-checking and racing.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

use super::is_unique_violation;
use crate::db::DbPool;
use crate::models::Media;
use crate::services::query::{DateWindow, ListFilter, Pagination, SortOrder, SortSpec};

/// Sortable fields for media lists
const MEDIA_SORT: SortSpec = SortSpec::new(
    &[
        ("name", "m.name"),
        ("uploader", "a.username"),
        ("uploaded_at", "m.uploaded_at"),
    ],
    "m.uploaded_at",
);

/// Filter, sort, and pagination parameters for media lists
#[derive(Debug, Clone, Default)]
pub struct MediaListParams {
    /// Substring match on the name
    pub name: Option<String>,
    /// Exact match on the uploader
    pub uploader_id: Option<i64>,
    /// Upload-timestamp window
    pub uploaded: Option<DateWindow>,
    /// Requested sort field (resolved against the allow-list)
    pub sort: Option<String>,
    pub order: SortOrder,
    pub pagination: Pagination,
}

impl MediaListParams {
    fn filter(&self) -> ListFilter {
        ListFilter::new()
            .contains("m.name", self.name.as_deref())
            .equals_id("m.uploader_id", self.uploader_id)
            .within("m.uploaded_at", self.uploaded)
    }
}

/// Page of media plus list-level aggregates
#[derive(Debug, Clone)]
pub struct MediaPage {
    pub items: Vec<Media>,
    pub total: i64,
    /// Most recent upload timestamp among the matches
    pub newest: Option<DateTime<Utc>>,
}

/// Media repository trait
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// List media matching the params with the total count and the newest
    /// upload timestamp among all matches.
    async fn list(&self, params: &MediaListParams) -> Result<MediaPage>;

    /// Get a media record by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Media>>;

    /// Insert a media record. Returns `None` when the name or slug is
    /// already taken.
    async fn try_create(
        &self,
        name: &str,
        slug: &str,
        url: &str,
        size: &str,
        uploader_id: i64,
    ) -> Result<Option<Media>>;

    /// Replace a media record's fields. Returns `None` when the new name or
    /// slug is already taken by another record.
    async fn try_update(
        &self,
        id: i64,
        name: &str,
        slug: &str,
        url: &str,
        size: &str,
    ) -> Result<Option<Media>>;

    /// Delete a media record by slug. Returns `false` when it does not exist.
    async fn delete_by_slug(&self, slug: &str) -> Result<bool>;
}

/// SQLx-based media repository implementation
pub struct SqlxMediaRepository {
    pool: DbPool,
}

impl SqlxMediaRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn MediaRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_MEDIA: &str = "SELECT m.id, m.name, m.slug, m.url, m.size, m.uploader_id, \
     a.username AS uploader, m.uploaded_at \
     FROM media m LEFT JOIN admins a ON a.id = m.uploader_id";

#[async_trait]
impl MediaRepository for SqlxMediaRepository {
    async fn list(&self, params: &MediaListParams) -> Result<MediaPage> {
        let filter = params.filter();
        let where_sql = filter.where_sql();
        let order_by = MEDIA_SORT.resolve(params.sort.as_deref());

        let list_sql = format!(
            "{} {} ORDER BY {} {} LIMIT ? OFFSET ?",
            SELECT_MEDIA,
            where_sql,
            order_by,
            params.order.as_sql()
        );
        let aggregate_sql = format!(
            "SELECT COUNT(*), MAX(m.uploaded_at) \
             FROM media m LEFT JOIN admins a ON a.id = m.uploader_id {}",
            where_sql
        );

        // One transaction so the page and the aggregates see the same snapshot
        let mut tx = self.pool.begin().await.context("Failed to begin list")?;

        let rows = filter
            .bind(sqlx::query(&list_sql))
            .bind(params.pagination.limit())
            .bind(params.pagination.offset())
            .fetch_all(&mut *tx)
            .await
            .context("Failed to list media")?;

        let aggregates = filter
            .bind(sqlx::query(&aggregate_sql))
            .fetch_one(&mut *tx)
            .await
            .context("Failed to aggregate media")?;
        let total: i64 = aggregates.try_get(0)?;
        let newest: Option<DateTime<Utc>> = aggregates.try_get(1)?;

        tx.commit().await.context("Failed to commit list")?;

        let items = rows.iter().map(map_media).collect::<Result<Vec<_>>>()?;
        Ok(MediaPage {
            items,
            total,
            newest,
        })
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Media>> {
        let row = sqlx::query(&format!("{} WHERE m.slug = ?", SELECT_MEDIA))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch media")?;
        row.as_ref().map(map_media).transpose()
    }

    async fn try_create(
        &self,
        name: &str,
        slug: &str,
        url: &str,
        size: &str,
        uploader_id: i64,
    ) -> Result<Option<Media>> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO media (name, slug, url, size, uploader_id, uploaded_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(slug)
        .bind(url)
        .bind(size)
        .bind(uploader_id)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let row = sqlx::query(&format!("{} WHERE m.id = ?", SELECT_MEDIA))
                    .bind(done.last_insert_rowid())
                    .fetch_one(&self.pool)
                    .await
                    .context("Created media not found")?;
                Ok(Some(map_media(&row)?))
            }
            Err(err) if is_unique_violation(&err) => Ok(None),
            Err(err) => Err(err).context("Failed to create media"),
        }
    }

    async fn try_update(
        &self,
        id: i64,
        name: &str,
        slug: &str,
        url: &str,
        size: &str,
    ) -> Result<Option<Media>> {
        let result = sqlx::query("UPDATE media SET name = ?, slug = ?, url = ?, size = ? WHERE id = ?")
            .bind(name)
            .bind(slug)
            .bind(url)
            .bind(size)
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => {
                let row = sqlx::query(&format!("{} WHERE m.id = ?", SELECT_MEDIA))
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await
                    .context("Updated media not found")?;
                Ok(Some(map_media(&row)?))
            }
            Ok(_) => Ok(None),
            Err(err) if is_unique_violation(&err) => Ok(None),
            Err(err) => Err(err).context("Failed to update media"),
        }
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM media WHERE slug = ?")
            .bind(slug)
            .execute(&self.pool)
            .await
            .context("Failed to delete media")?;
        Ok(result.rows_affected() > 0)
    }
}

/// Map a database row to a `Media`
fn map_media(row: &SqliteRow) -> Result<Media> {
    Ok(Media {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        url: row.try_get("url")?,
        size: row.try_get("size")?,
        uploader_id: row.try_get("uploader_id")?,
        uploader: row.try_get("uploader")?,
        uploaded_at: row.try_get("uploaded_at")?,
    })
}
