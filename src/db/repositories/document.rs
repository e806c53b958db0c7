//! Document repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::Document;
use crate::services::query::{DateWindow, ListFilter, Pagination, SortOrder, SortSpec};

/// Sortable fields for document lists
const DOCUMENT_SORT: SortSpec = SortSpec::new(
    &[
        ("name", "d.name"),
        ("category", "d.category"),
        ("created_at", "d.created_at"),
    ],
    "d.created_at",
);

/// Filter, sort, and pagination parameters for document lists
#[derive(Debug, Clone, Default)]
pub struct DocumentListParams {
    /// Substring match on the name
    pub name: Option<String>,
    /// Exact match on the category
    pub category: Option<String>,
    /// Creation-timestamp window
    pub created: Option<DateWindow>,
    /// Requested sort field (resolved against the allow-list)
    pub sort: Option<String>,
    pub order: SortOrder,
    pub pagination: Pagination,
}

impl DocumentListParams {
    fn filter(&self) -> ListFilter {
        ListFilter::new()
            .contains("d.name", self.name.as_deref())
            .equals_text("d.category", self.category.as_deref())
            .within("d.created_at", self.created)
    }
}

/// Document repository trait
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// List documents matching the params with the total match count
    async fn list(&self, params: &DocumentListParams) -> Result<(Vec<Document>, i64)>;

    /// Get a document by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Document>>;

    /// Create a document
    async fn create(
        &self,
        name: &str,
        slug: &str,
        category: &str,
        url: &str,
        size: &str,
        uploader_id: i64,
    ) -> Result<Document>;

    /// Replace a document's fields. Returns `None` when it does not exist.
    async fn update(
        &self,
        id: i64,
        name: &str,
        slug: &str,
        category: &str,
        url: &str,
        size: &str,
    ) -> Result<Option<Document>>;

    /// Delete a document. Returns `false` when it does not exist.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Whether a document slug is already taken, optionally ignoring one row
    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;
}

/// SQLx-based document repository implementation
pub struct SqlxDocumentRepository {
    pool: DbPool,
}

impl SqlxDocumentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn DocumentRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_DOCUMENT: &str = "SELECT d.id, d.name, d.slug, d.category, d.url, d.size, \
     d.uploader_id, a.username AS uploader, d.created_at, d.updated_at \
     FROM documents d LEFT JOIN admins a ON a.id = d.uploader_id";

#[async_trait]
impl DocumentRepository for SqlxDocumentRepository {
    async fn list(&self, params: &DocumentListParams) -> Result<(Vec<Document>, i64)> {
        let filter = params.filter();
        let where_sql = filter.where_sql();
        let order_by = DOCUMENT_SORT.resolve(params.sort.as_deref());

        let list_sql = format!(
            "{} {} ORDER BY {} {} LIMIT ? OFFSET ?",
            SELECT_DOCUMENT,
            where_sql,
            order_by,
            params.order.as_sql()
        );
        let count_sql = format!(
            "SELECT COUNT(*) FROM documents d LEFT JOIN admins a ON a.id = d.uploader_id {}",
            where_sql
        );

        let mut tx = self.pool.begin().await.context("Failed to begin list")?;

        let rows = filter
            .bind(sqlx::query(&list_sql))
            .bind(params.pagination.limit())
            .bind(params.pagination.offset())
            .fetch_all(&mut *tx)
            .await
            .context("Failed to list documents")?;

        let total: i64 = filter
            .bind(sqlx::query(&count_sql))
            .fetch_one(&mut *tx)
            .await
            .context("Failed to count documents")?
            .try_get(0)?;

        tx.commit().await.context("Failed to commit list")?;

        let documents = rows.iter().map(map_document).collect::<Result<Vec<_>>>()?;
        Ok((documents, total))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Document>> {
        let row = sqlx::query(&format!("{} WHERE d.id = ?", SELECT_DOCUMENT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch document")?;
        row.as_ref().map(map_document).transpose()
    }

    async fn create(
        &self,
        name: &str,
        slug: &str,
        category: &str,
        url: &str,
        size: &str,
        uploader_id: i64,
    ) -> Result<Document> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO documents (name, slug, category, url, size, uploader_id, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(slug)
        .bind(category)
        .bind(url)
        .bind(size)
        .bind(uploader_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create document")?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .context("Created document not found")
    }

    async fn update(
        &self,
        id: i64,
        name: &str,
        slug: &str,
        category: &str,
        url: &str,
        size: &str,
    ) -> Result<Option<Document>> {
        let result = sqlx::query(
            "UPDATE documents SET name = ?, slug = ?, category = ?, url = ?, size = ?, \
             updated_at = ? WHERE id = ?",
        )
        .bind(name)
        .bind(slug)
        .bind(category)
        .bind(url)
        .bind(size)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update document")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete document")?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let count: i64 = match exclude_id {
            Some(id) => {
                sqlx::query("SELECT COUNT(*) FROM documents WHERE slug = ? AND id != ?")
                    .bind(slug)
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await
                    .context("Failed to check document slug")?
                    .try_get(0)?
            }
            None => sqlx::query("SELECT COUNT(*) FROM documents WHERE slug = ?")
                .bind(slug)
                .fetch_one(&self.pool)
                .await
                .context("Failed to check document slug")?
                .try_get(0)?,
        };
        Ok(count > 0)
    }
}

/// Map a database row to a `Document`
fn map_document(row: &SqliteRow) -> Result<Document> {
    Ok(Document {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        category: row.try_get("category")?,
        url: row.try_get("url")?,
        size: row.try_get("size")?,
        uploader_id: row.try_get("uploader_id")?,
        uploader: row.try_get("uploader")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{AdminRepository, SqlxAdminRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> (SqlxDocumentRepository, i64) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let admin = SqlxAdminRepository::new(pool.clone())
            .create("admin1", "admin1@mail.com", "hash")
            .await
            .unwrap();
        (SqlxDocumentRepository::new(pool), admin.id)
    }

    #[tokio::test]
    async fn crud_roundtrip() {
        let (repo, uploader) = setup().await;
        let doc = repo
            .create("ISO 9001", "iso-9001", "certification", "http://x/iso.pdf", "523 KB", uploader)
            .await
            .unwrap();
        assert_eq!(doc.uploader.as_deref(), Some("admin1"));

        let updated = repo
            .update(doc.id, "ISO 9002", "iso-9002", "certification", doc.url.as_str(), "523 KB")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.slug, "iso-9002");

        assert!(repo.delete(doc.id).await.unwrap());
        assert!(repo.get_by_id(doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_by_category_exactly() {
        let (repo, uploader) = setup().await;
        repo.create("Permit", "permit", "legality", "u", "1 KB", uploader).await.unwrap();
        repo.create("ISO", "iso", "certification", "u", "1 KB", uploader).await.unwrap();
        repo.create("Trophy", "trophy", "award", "u", "1 KB", uploader).await.unwrap();

        let params = DocumentListParams {
            category: Some("award".to_string()),
            ..Default::default()
        };
        let (docs, total) = repo.list(&params).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(docs[0].name, "Trophy");
    }
}
