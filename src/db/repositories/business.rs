//! Business repository
//!
//! Covers businesses and their attached items (products, projects, and
//! services). Items share one table discriminated by `kind`; slugs are
//! unique per kind, so a product and a service may carry the same slug.
//! Item media URLs are stored as a JSON array in a text column.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{Business, BusinessItem, ItemKind};
use crate::services::query::{DateWindow, ListFilter, Pagination, SortOrder, SortSpec};

/// Sortable fields for business lists
const BUSINESS_SORT: SortSpec = SortSpec::new(
    &[("title", "title"), ("created_at", "created_at")],
    "created_at",
);

/// Sortable fields for item lists
const ITEM_SORT: SortSpec = SortSpec::new(
    &[("title", "title"), ("created_at", "created_at")],
    "created_at",
);

/// Filter, sort, and pagination parameters for business lists
#[derive(Debug, Clone, Default)]
pub struct BusinessListParams {
    /// Substring match on the title
    pub title: Option<String>,
    /// Creation-timestamp window
    pub created: Option<DateWindow>,
    /// Requested sort field (resolved against the allow-list)
    pub sort: Option<String>,
    pub order: SortOrder,
    pub pagination: Pagination,
}

impl BusinessListParams {
    fn filter(&self) -> ListFilter {
        ListFilter::new()
            .contains("title", self.title.as_deref())
            .within("created_at", self.created)
    }
}

/// Filter, sort, and pagination parameters for item lists.
///
/// The kind is supplied separately by the caller and always filters.
#[derive(Debug, Clone, Default)]
pub struct BusinessItemListParams {
    /// Substring match on the title
    pub title: Option<String>,
    /// Exact match on the owning business
    pub business_id: Option<i64>,
    /// Creation-timestamp window
    pub created: Option<DateWindow>,
    /// Requested sort field (resolved against the allow-list)
    pub sort: Option<String>,
    pub order: SortOrder,
    pub pagination: Pagination,
}

impl BusinessItemListParams {
    fn filter(&self, kind: ItemKind) -> ListFilter {
        ListFilter::new()
            .equals_text("kind", Some(kind.as_str()))
            .contains("title", self.title.as_deref())
            .equals_id("business_id", self.business_id)
            .within("created_at", self.created)
    }
}

/// Business repository trait
#[async_trait]
pub trait BusinessRepository: Send + Sync {
    /// List businesses matching the params with the total match count
    async fn list(&self, params: &BusinessListParams) -> Result<(Vec<Business>, i64)>;

    /// Get a business by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Business>>;

    /// Get a business by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Business>>;

    /// Create a business
    async fn create(
        &self,
        title: &str,
        slug: &str,
        description: &str,
        image_header_url: Option<&str>,
        product_header_url: Option<&str>,
    ) -> Result<Business>;

    /// Replace a business's fields. Returns `None` when it does not exist.
    async fn update(
        &self,
        id: i64,
        title: &str,
        slug: &str,
        description: &str,
        image_header_url: Option<&str>,
        product_header_url: Option<&str>,
    ) -> Result<Option<Business>>;

    /// Delete a business and (by cascade) its items. Returns `false` when it
    /// does not exist.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Whether a business slug is already taken, optionally ignoring one row
    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;

    /// List items of one kind matching the params with the total match count
    async fn list_items(
        &self,
        kind: ItemKind,
        params: &BusinessItemListParams,
    ) -> Result<(Vec<BusinessItem>, i64)>;

    /// Get an item of one kind by slug
    async fn get_item(&self, kind: ItemKind, slug: &str) -> Result<Option<BusinessItem>>;

    /// Create an item
    async fn create_item(
        &self,
        kind: ItemKind,
        title: &str,
        slug: &str,
        description: &str,
        media_urls: &[String],
        business_id: i64,
    ) -> Result<BusinessItem>;

    /// Replace an item's fields. Returns `None` when it does not exist.
    async fn update_item(
        &self,
        id: i64,
        title: &str,
        slug: &str,
        description: &str,
        media_urls: &[String],
        business_id: i64,
    ) -> Result<Option<BusinessItem>>;

    /// Delete an item of one kind by slug. Returns `false` when it does not
    /// exist.
    async fn delete_item(&self, kind: ItemKind, slug: &str) -> Result<bool>;

    /// Whether an item slug is already taken within a kind, optionally
    /// ignoring one row
    async fn item_exists_by_slug(
        &self,
        kind: ItemKind,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool>;
}

/// SQLx-based business repository implementation
pub struct SqlxBusinessRepository {
    pool: DbPool,
}

impl SqlxBusinessRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn BusinessRepository> {
        Arc::new(Self::new(pool))
    }

    async fn get_item_by_id(&self, id: i64) -> Result<Option<BusinessItem>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_ITEM))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch item")?;
        row.as_ref().map(map_item).transpose()
    }
}

const SELECT_BUSINESS: &str = "SELECT id, title, slug, description, image_header_url, \
     product_header_url, created_at, updated_at FROM businesses";

const SELECT_ITEM: &str = "SELECT id, kind, title, slug, description, media_urls, \
     business_id, created_at, updated_at FROM business_items";

#[async_trait]
impl BusinessRepository for SqlxBusinessRepository {
    async fn list(&self, params: &BusinessListParams) -> Result<(Vec<Business>, i64)> {
        let filter = params.filter();
        let where_sql = filter.where_sql();
        let order_by = BUSINESS_SORT.resolve(params.sort.as_deref());

        let list_sql = format!(
            "{} {} ORDER BY {} {} LIMIT ? OFFSET ?",
            SELECT_BUSINESS,
            where_sql,
            order_by,
            params.order.as_sql()
        );
        let count_sql = format!("SELECT COUNT(*) FROM businesses {}", where_sql);

        let mut tx = self.pool.begin().await.context("Failed to begin list")?;

        let rows = filter
            .bind(sqlx::query(&list_sql))
            .bind(params.pagination.limit())
            .bind(params.pagination.offset())
            .fetch_all(&mut *tx)
            .await
            .context("Failed to list businesses")?;

        let total: i64 = filter
            .bind(sqlx::query(&count_sql))
            .fetch_one(&mut *tx)
            .await
            .context("Failed to count businesses")?
            .try_get(0)?;

        tx.commit().await.context("Failed to commit list")?;

        let businesses = rows.iter().map(map_business).collect::<Result<Vec<_>>>()?;
        Ok((businesses, total))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Business>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_BUSINESS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch business")?;
        row.as_ref().map(map_business).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Business>> {
        let row = sqlx::query(&format!("{} WHERE slug = ?", SELECT_BUSINESS))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch business")?;
        row.as_ref().map(map_business).transpose()
    }

    async fn create(
        &self,
        title: &str,
        slug: &str,
        description: &str,
        image_header_url: Option<&str>,
        product_header_url: Option<&str>,
    ) -> Result<Business> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO businesses (title, slug, description, image_header_url, \
             product_header_url, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(title)
        .bind(slug)
        .bind(description)
        .bind(image_header_url)
        .bind(product_header_url)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create business")?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .context("Created business not found")
    }

    async fn update(
        &self,
        id: i64,
        title: &str,
        slug: &str,
        description: &str,
        image_header_url: Option<&str>,
        product_header_url: Option<&str>,
    ) -> Result<Option<Business>> {
        let result = sqlx::query(
            "UPDATE businesses SET title = ?, slug = ?, description = ?, \
             image_header_url = ?, product_header_url = ?, updated_at = ? WHERE id = ?",
        )
        .bind(title)
        .bind(slug)
        .bind(description)
        .bind(image_header_url)
        .bind(product_header_url)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update business")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM businesses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete business")?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let count: i64 = match exclude_id {
            Some(id) => {
                sqlx::query("SELECT COUNT(*) FROM businesses WHERE slug = ? AND id != ?")
                    .bind(slug)
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await
                    .context("Failed to check business slug")?
                    .try_get(0)?
            }
            None => sqlx::query("SELECT COUNT(*) FROM businesses WHERE slug = ?")
                .bind(slug)
                .fetch_one(&self.pool)
                .await
                .context("Failed to check business slug")?
                .try_get(0)?,
        };
        Ok(count > 0)
    }

    async fn list_items(
        &self,
        kind: ItemKind,
        params: &BusinessItemListParams,
    ) -> Result<(Vec<BusinessItem>, i64)> {
        let filter = params.filter(kind);
        let where_sql = filter.where_sql();
        let order_by = ITEM_SORT.resolve(params.sort.as_deref());

        let list_sql = format!(
            "{} {} ORDER BY {} {} LIMIT ? OFFSET ?",
            SELECT_ITEM,
            where_sql,
            order_by,
            params.order.as_sql()
        );
        let count_sql = format!("SELECT COUNT(*) FROM business_items {}", where_sql);

        let mut tx = self.pool.begin().await.context("Failed to begin list")?;

        let rows = filter
            .bind(sqlx::query(&list_sql))
            .bind(params.pagination.limit())
            .bind(params.pagination.offset())
            .fetch_all(&mut *tx)
            .await
            .context("Failed to list items")?;

        let total: i64 = filter
            .bind(sqlx::query(&count_sql))
            .fetch_one(&mut *tx)
            .await
            .context("Failed to count items")?
            .try_get(0)?;

        tx.commit().await.context("Failed to commit list")?;

        let items = rows.iter().map(map_item).collect::<Result<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn get_item(&self, kind: ItemKind, slug: &str) -> Result<Option<BusinessItem>> {
        let row = sqlx::query(&format!("{} WHERE kind = ? AND slug = ?", SELECT_ITEM))
            .bind(kind.as_str())
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch item")?;
        row.as_ref().map(map_item).transpose()
    }

    async fn create_item(
        &self,
        kind: ItemKind,
        title: &str,
        slug: &str,
        description: &str,
        media_urls: &[String],
        business_id: i64,
    ) -> Result<BusinessItem> {
        let now = Utc::now();
        let media_json =
            serde_json::to_string(media_urls).context("Failed to encode media URLs")?;
        let result = sqlx::query(
            "INSERT INTO business_items (kind, title, slug, description, media_urls, \
             business_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(kind.as_str())
        .bind(title)
        .bind(slug)
        .bind(description)
        .bind(media_json)
        .bind(business_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create item")?;

        self.get_item_by_id(result.last_insert_rowid())
            .await?
            .context("Created item not found")
    }

    async fn update_item(
        &self,
        id: i64,
        title: &str,
        slug: &str,
        description: &str,
        media_urls: &[String],
        business_id: i64,
    ) -> Result<Option<BusinessItem>> {
        let media_json =
            serde_json::to_string(media_urls).context("Failed to encode media URLs")?;
        let result = sqlx::query(
            "UPDATE business_items SET title = ?, slug = ?, description = ?, \
             media_urls = ?, business_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(title)
        .bind(slug)
        .bind(description)
        .bind(media_json)
        .bind(business_id)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update item")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_item_by_id(id).await
    }

    async fn delete_item(&self, kind: ItemKind, slug: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM business_items WHERE kind = ? AND slug = ?")
            .bind(kind.as_str())
            .bind(slug)
            .execute(&self.pool)
            .await
            .context("Failed to delete item")?;
        Ok(result.rows_affected() > 0)
    }

    async fn item_exists_by_slug(
        &self,
        kind: ItemKind,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let count: i64 = match exclude_id {
            Some(id) => sqlx::query(
                "SELECT COUNT(*) FROM business_items WHERE kind = ? AND slug = ? AND id != ?",
            )
            .bind(kind.as_str())
            .bind(slug)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check item slug")?
            .try_get(0)?,
            None => sqlx::query("SELECT COUNT(*) FROM business_items WHERE kind = ? AND slug = ?")
                .bind(kind.as_str())
                .bind(slug)
                .fetch_one(&self.pool)
                .await
                .context("Failed to check item slug")?
                .try_get(0)?,
        };
        Ok(count > 0)
    }
}

/// Map a database row to a `Business`
fn map_business(row: &SqliteRow) -> Result<Business> {
    Ok(Business {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        image_header_url: row.try_get("image_header_url")?,
        product_header_url: row.try_get("product_header_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Map a database row to a `BusinessItem`
fn map_item(row: &SqliteRow) -> Result<BusinessItem> {
    let kind: String = row.try_get("kind")?;
    let kind = ItemKind::parse(&kind)
        .with_context(|| format!("Unknown item kind '{}' in store", kind))?;

    let media_json: String = row.try_get("media_urls")?;
    let media_urls: Vec<String> =
        serde_json::from_str(&media_json).context("Corrupt media URL list")?;

    Ok(BusinessItem {
        id: row.try_get("id")?,
        kind,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        media_urls,
        business_id: row.try_get("business_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxBusinessRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxBusinessRepository::new(pool)
    }

    async fn seed_business(repo: &SqlxBusinessRepository) -> Business {
        repo.create("Civil Engineering", "civil-engineering", "Roads", None, None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn business_crud() {
        let repo = setup().await;
        let business = seed_business(&repo).await;
        assert_eq!(business.slug, "civil-engineering");

        let fetched = repo.get_by_slug("civil-engineering").await.unwrap().unwrap();
        assert_eq!(fetched.id, business.id);

        let updated = repo
            .update(
                business.id,
                "Heavy Engineering",
                "heavy-engineering",
                "Bridges",
                Some("http://x/header.png"),
                None,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Heavy Engineering");
        assert_eq!(updated.image_header_url.as_deref(), Some("http://x/header.png"));

        assert!(repo.delete(business.id).await.unwrap());
        assert!(!repo.delete(business.id).await.unwrap());
    }

    #[tokio::test]
    async fn item_media_urls_roundtrip() {
        let repo = setup().await;
        let business = seed_business(&repo).await;

        let urls = vec!["http://x/1.png".to_string(), "http://x/2.png".to_string()];
        let item = repo
            .create_item(
                ItemKind::Product,
                "Asphalt Mix",
                "asphalt-mix",
                "Premium blend",
                &urls,
                business.id,
            )
            .await
            .unwrap();
        assert_eq!(item.kind, ItemKind::Product);
        assert_eq!(item.media_urls, urls);

        let fetched = repo
            .get_item(ItemKind::Product, "asphalt-mix")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.media_urls, urls);
    }

    #[tokio::test]
    async fn item_slugs_are_scoped_per_kind() {
        let repo = setup().await;
        let business = seed_business(&repo).await;

        repo.create_item(ItemKind::Product, "Survey", "survey", "d", &[], business.id)
            .await
            .unwrap();
        // Same slug under a different kind is fine
        repo.create_item(ItemKind::Service, "Survey", "survey", "d", &[], business.id)
            .await
            .unwrap();

        assert!(repo
            .item_exists_by_slug(ItemKind::Product, "survey", None)
            .await
            .unwrap());
        assert!(repo
            .item_exists_by_slug(ItemKind::Service, "survey", None)
            .await
            .unwrap());
        assert!(!repo
            .item_exists_by_slug(ItemKind::Project, "survey", None)
            .await
            .unwrap());

        assert!(repo.get_item(ItemKind::Project, "survey").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_items_filters_by_kind_and_business() {
        let repo = setup().await;
        let first = seed_business(&repo).await;
        let second = repo
            .create("Mining", "mining", "Ore", None, None)
            .await
            .unwrap();

        repo.create_item(ItemKind::Product, "A", "a", "d", &[], first.id).await.unwrap();
        repo.create_item(ItemKind::Product, "B", "b", "d", &[], second.id).await.unwrap();
        repo.create_item(ItemKind::Service, "C", "c", "d", &[], first.id).await.unwrap();

        let (items, total) = repo
            .list_items(ItemKind::Product, &BusinessItemListParams::default())
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert!(items.iter().all(|i| i.kind == ItemKind::Product));

        let params = BusinessItemListParams {
            business_id: Some(first.id),
            ..Default::default()
        };
        let (items, total) = repo.list_items(ItemKind::Product, &params).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].slug, "a");
    }

    #[tokio::test]
    async fn deleting_business_cascades_to_items() {
        let repo = setup().await;
        let business = seed_business(&repo).await;
        repo.create_item(ItemKind::Product, "A", "a", "d", &[], business.id)
            .await
            .unwrap();

        assert!(repo.delete(business.id).await.unwrap());
        assert!(repo.get_item(ItemKind::Product, "a").await.unwrap().is_none());
    }
}
