//! Blog repository
//!
//! List queries join the authors table so every returned post carries the
//! author's username alongside the raw foreign key.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::Blog;
use crate::services::query::{DateWindow, ListFilter, Pagination, SortOrder, SortSpec};

/// Sortable fields for blog lists
const BLOG_SORT: SortSpec = SortSpec::new(
    &[
        ("title", "b.title"),
        ("author", "a.username"),
        ("created_at", "b.created_at"),
        ("updated_at", "b.updated_at"),
    ],
    "b.created_at",
);

/// Filter, sort, and pagination parameters for blog lists
#[derive(Debug, Clone, Default)]
pub struct BlogListParams {
    /// Substring match on the title
    pub title: Option<String>,
    /// Exact match on the author
    pub author_id: Option<i64>,
    /// Creation-timestamp window
    pub created: Option<DateWindow>,
    /// Last-edit-timestamp window
    pub updated: Option<DateWindow>,
    /// Requested sort field (resolved against the allow-list)
    pub sort: Option<String>,
    pub order: SortOrder,
    pub pagination: Pagination,
}

impl BlogListParams {
    fn filter(&self) -> ListFilter {
        ListFilter::new()
            .contains("b.title", self.title.as_deref())
            .equals_id("b.author_id", self.author_id)
            .within("b.created_at", self.created)
            .within("b.updated_at", self.updated)
    }
}

/// Blog repository trait
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// List posts matching the params, newest-first by default.
    ///
    /// Returns the page of posts and the total match count.
    async fn list(&self, params: &BlogListParams) -> Result<(Vec<Blog>, i64)>;

    /// Get a post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Blog>>;

    /// Create a new post
    async fn create(&self, title: &str, slug: &str, content: &str, author_id: i64)
        -> Result<Blog>;

    /// Replace a post's content fields. Returns `None` when the post does
    /// not exist.
    async fn update(&self, id: i64, title: &str, slug: &str, content: &str)
        -> Result<Option<Blog>>;

    /// Delete a post. Returns `false` when the post does not exist.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Whether a slug is already taken, optionally ignoring one post
    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;
}

/// SQLx-based blog repository implementation
pub struct SqlxBlogRepository {
    pool: DbPool,
}

impl SqlxBlogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn BlogRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_BLOG: &str = "SELECT b.id, b.title, b.slug, b.content, b.author_id, \
     a.username AS author, b.created_at, b.updated_at \
     FROM blogs b LEFT JOIN admins a ON a.id = b.author_id";

#[async_trait]
impl BlogRepository for SqlxBlogRepository {
    async fn list(&self, params: &BlogListParams) -> Result<(Vec<Blog>, i64)> {
        let filter = params.filter();
        let where_sql = filter.where_sql();
        let order_by = BLOG_SORT.resolve(params.sort.as_deref());

        let list_sql = format!(
            "{} {} ORDER BY {} {} LIMIT ? OFFSET ?",
            SELECT_BLOG,
            where_sql,
            order_by,
            params.order.as_sql()
        );
        let count_sql = format!(
            "SELECT COUNT(*) FROM blogs b LEFT JOIN admins a ON a.id = b.author_id {}",
            where_sql
        );

        // One transaction so the page and the total see the same snapshot
        let mut tx = self.pool.begin().await.context("Failed to begin list")?;

        let rows = filter
            .bind(sqlx::query(&list_sql))
            .bind(params.pagination.limit())
            .bind(params.pagination.offset())
            .fetch_all(&mut *tx)
            .await
            .context("Failed to list blogs")?;

        let total: i64 = filter
            .bind(sqlx::query(&count_sql))
            .fetch_one(&mut *tx)
            .await
            .context("Failed to count blogs")?
            .try_get(0)?;

        tx.commit().await.context("Failed to commit list")?;

        let blogs = rows.iter().map(map_blog).collect::<Result<Vec<_>>>()?;
        Ok((blogs, total))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Blog>> {
        let row = sqlx::query(&format!("{} WHERE b.id = ?", SELECT_BLOG))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch blog")?;
        row.as_ref().map(map_blog).transpose()
    }

    async fn create(
        &self,
        title: &str,
        slug: &str,
        content: &str,
        author_id: i64,
    ) -> Result<Blog> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO blogs (title, slug, content, author_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(title)
        .bind(slug)
        .bind(content)
        .bind(author_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create blog")?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .context("Created blog not found")
    }

    async fn update(
        &self,
        id: i64,
        title: &str,
        slug: &str,
        content: &str,
    ) -> Result<Option<Blog>> {
        let result = sqlx::query(
            "UPDATE blogs SET title = ?, slug = ?, content = ?, updated_at = ? WHERE id = ?",
        )
        .bind(title)
        .bind(slug)
        .bind(content)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update blog")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete blog")?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let count: i64 = match exclude_id {
            Some(id) => {
                sqlx::query("SELECT COUNT(*) FROM blogs WHERE slug = ? AND id != ?")
                    .bind(slug)
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await
                    .context("Failed to check blog slug")?
                    .try_get(0)?
            }
            None => sqlx::query("SELECT COUNT(*) FROM blogs WHERE slug = ?")
                .bind(slug)
                .fetch_one(&self.pool)
                .await
                .context("Failed to check blog slug")?
                .try_get(0)?,
        };
        Ok(count > 0)
    }
}

/// Map a database row to a `Blog`
fn map_blog(row: &SqliteRow) -> Result<Blog> {
    Ok(Blog {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        content: row.try_get("content")?,
        author_id: row.try_get("author_id")?,
        author: row.try_get("author")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxAdminRepository;
    use crate::db::repositories::AdminRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> (SqlxBlogRepository, i64) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let admin = SqlxAdminRepository::new(pool.clone())
            .create("admin1", "admin1@mail.com", "hash")
            .await
            .unwrap();
        (SqlxBlogRepository::new(pool), admin.id)
    }

    #[tokio::test]
    async fn create_joins_author_username() {
        let (repo, author_id) = setup().await;
        let blog = repo
            .create("Hello World", "hello-world", "body", author_id)
            .await
            .unwrap();

        assert_eq!(blog.slug, "hello-world");
        assert_eq!(blog.author.as_deref(), Some("admin1"));
    }

    #[tokio::test]
    async fn list_filters_by_title_substring() {
        let (repo, author_id) = setup().await;
        repo.create("Rust Patterns", "rust-patterns", "a", author_id).await.unwrap();
        repo.create("Go Patterns", "go-patterns", "b", author_id).await.unwrap();
        repo.create("Rustlings", "rustlings", "c", author_id).await.unwrap();

        let params = BlogListParams {
            title: Some("rust".to_string()),
            ..Default::default()
        };
        let (blogs, total) = repo.list(&params).await.unwrap();
        assert_eq!(total, 2);
        assert!(blogs.iter().all(|b| b.title.to_lowercase().contains("rust")));
    }

    #[tokio::test]
    async fn list_total_counts_beyond_page() {
        let (repo, author_id) = setup().await;
        for i in 0..5 {
            repo.create(
                &format!("Post {}", i),
                &format!("post-{}", i),
                "body",
                author_id,
            )
            .await
            .unwrap();
        }

        let params = BlogListParams {
            pagination: Pagination::new(Some(1), Some(2)),
            ..Default::default()
        };
        let (blogs, total) = repo.list(&params).await.unwrap();
        assert_eq!(blogs.len(), 2);
        assert_eq!(total, 5);
    }

    #[tokio::test]
    async fn list_filters_by_update_window() {
        use chrono::TimeZone;

        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let admin = SqlxAdminRepository::new(pool.clone())
            .create("admin1", "admin1@mail.com", "hash")
            .await
            .unwrap();
        let repo = SqlxBlogRepository::new(pool.clone());

        let stale = repo.create("Stale", "stale", "body", admin.id).await.unwrap();
        repo.create("Fresh", "fresh", "body", admin.id).await.unwrap();

        // Backdate one post's edit timestamp; its creation stays today
        sqlx::query("UPDATE blogs SET updated_at = ? WHERE id = ?")
            .bind(Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap())
            .bind(stale.id)
            .execute(&pool)
            .await
            .unwrap();

        let window = DateWindow::from_bounds(Some("2020-01-01"), Some("2020-01-02"))
            .unwrap()
            .unwrap();
        let params = BlogListParams {
            updated: Some(window),
            ..Default::default()
        };
        let (blogs, total) = repo.list(&params).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(blogs[0].title, "Stale");

        // The same window applied to creation matches nothing
        let params = BlogListParams {
            created: Some(window),
            ..Default::default()
        };
        let (_, total) = repo.list(&params).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn list_sorts_by_allowed_field() {
        let (repo, author_id) = setup().await;
        repo.create("Bravo", "bravo", "b", author_id).await.unwrap();
        repo.create("Alpha", "alpha", "a", author_id).await.unwrap();

        let params = BlogListParams {
            sort: Some("title".to_string()),
            order: SortOrder::Asc,
            ..Default::default()
        };
        let (blogs, _) = repo.list(&params).await.unwrap();
        assert_eq!(blogs[0].title, "Alpha");
        assert_eq!(blogs[1].title, "Bravo");
    }

    #[tokio::test]
    async fn update_and_delete() {
        let (repo, author_id) = setup().await;
        let blog = repo.create("Old", "old", "body", author_id).await.unwrap();

        let updated = repo
            .update(blog.id, "New", "new", "fresh body")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.slug, "new");

        assert!(repo.update(9999, "X", "x", "y").await.unwrap().is_none());

        assert!(repo.delete(blog.id).await.unwrap());
        assert!(!repo.delete(blog.id).await.unwrap());
    }

    #[tokio::test]
    async fn slug_existence_respects_exclusion() {
        let (repo, author_id) = setup().await;
        let blog = repo.create("Hello", "hello", "body", author_id).await.unwrap();

        assert!(repo.exists_by_slug("hello", None).await.unwrap());
        assert!(!repo.exists_by_slug("hello", Some(blog.id)).await.unwrap());
        assert!(!repo.exists_by_slug("other", None).await.unwrap());
    }
}
