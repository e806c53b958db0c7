//! Contact message repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::ContactMessage;
use crate::services::query::{DateWindow, ListFilter, Pagination, SortOrder, SortSpec};

/// Sortable fields for contact-message lists
const CONTACT_SORT: SortSpec = SortSpec::new(
    &[
        ("full_name", "full_name"),
        ("email", "email"),
        ("created_at", "created_at"),
    ],
    "created_at",
);

/// Filter, sort, and pagination parameters for contact-message lists
#[derive(Debug, Clone, Default)]
pub struct ContactListParams {
    /// Substring match on the resolved full name
    pub full_name: Option<String>,
    /// Substring match on the sender email
    pub email: Option<String>,
    /// Substring match on the phone number
    pub phone_number: Option<String>,
    /// Creation-timestamp window
    pub created: Option<DateWindow>,
    /// Last-edit-timestamp window
    pub updated: Option<DateWindow>,
    /// Requested sort field (resolved against the allow-list)
    pub sort: Option<String>,
    pub order: SortOrder,
    pub pagination: Pagination,
}

impl ContactListParams {
    fn filter(&self) -> ListFilter {
        ListFilter::new()
            .contains("full_name", self.full_name.as_deref())
            .contains("email", self.email.as_deref())
            .contains("phone_number", self.phone_number.as_deref())
            .within("created_at", self.created)
            .within("updated_at", self.updated)
    }
}

/// Contact message repository trait
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// List messages matching the params with the total match count
    async fn list(&self, params: &ContactListParams) -> Result<(Vec<ContactMessage>, i64)>;

    /// Get a message by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<ContactMessage>>;

    /// Store a new message
    async fn create(
        &self,
        full_name: &str,
        email: &str,
        phone_number: &str,
        message: &str,
    ) -> Result<ContactMessage>;

    /// Replace a message's fields. Returns `None` when it does not exist.
    async fn update(
        &self,
        id: i64,
        full_name: &str,
        email: &str,
        phone_number: &str,
        message: &str,
    ) -> Result<Option<ContactMessage>>;

    /// Delete a message. Returns `false` when it does not exist.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based contact message repository implementation
pub struct SqlxContactRepository {
    pool: DbPool,
}

impl SqlxContactRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn ContactRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_CONTACT: &str = "SELECT id, full_name, email, phone_number, message, \
     created_at, updated_at FROM contact_messages";

#[async_trait]
impl ContactRepository for SqlxContactRepository {
    async fn list(&self, params: &ContactListParams) -> Result<(Vec<ContactMessage>, i64)> {
        let filter = params.filter();
        let where_sql = filter.where_sql();
        let order_by = CONTACT_SORT.resolve(params.sort.as_deref());

        let list_sql = format!(
            "{} {} ORDER BY {} {} LIMIT ? OFFSET ?",
            SELECT_CONTACT,
            where_sql,
            order_by,
            params.order.as_sql()
        );
        let count_sql = format!("SELECT COUNT(*) FROM contact_messages {}", where_sql);

        let mut tx = self.pool.begin().await.context("Failed to begin list")?;

        let rows = filter
            .bind(sqlx::query(&list_sql))
            .bind(params.pagination.limit())
            .bind(params.pagination.offset())
            .fetch_all(&mut *tx)
            .await
            .context("Failed to list contact messages")?;

        let total: i64 = filter
            .bind(sqlx::query(&count_sql))
            .fetch_one(&mut *tx)
            .await
            .context("Failed to count contact messages")?
            .try_get(0)?;

        tx.commit().await.context("Failed to commit list")?;

        let messages = rows.iter().map(map_contact).collect::<Result<Vec<_>>>()?;
        Ok((messages, total))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ContactMessage>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_CONTACT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch contact message")?;
        row.as_ref().map(map_contact).transpose()
    }

    async fn create(
        &self,
        full_name: &str,
        email: &str,
        phone_number: &str,
        message: &str,
    ) -> Result<ContactMessage> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO contact_messages (full_name, email, phone_number, message, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(full_name)
        .bind(email)
        .bind(phone_number)
        .bind(message)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create contact message")?;

        Ok(ContactMessage {
            id: result.last_insert_rowid(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            phone_number: phone_number.to_string(),
            message: message.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn update(
        &self,
        id: i64,
        full_name: &str,
        email: &str,
        phone_number: &str,
        message: &str,
    ) -> Result<Option<ContactMessage>> {
        let result = sqlx::query(
            "UPDATE contact_messages SET full_name = ?, email = ?, phone_number = ?, \
             message = ?, updated_at = ? WHERE id = ?",
        )
        .bind(full_name)
        .bind(email)
        .bind(phone_number)
        .bind(message)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update contact message")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete contact message")?;
        Ok(result.rows_affected() > 0)
    }
}

/// Map a database row to a `ContactMessage`
fn map_contact(row: &SqliteRow) -> Result<ContactMessage> {
    Ok(ContactMessage {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        phone_number: row.try_get("phone_number")?,
        message: row.try_get("message")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxContactRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxContactRepository::new(pool)
    }

    #[tokio::test]
    async fn crud_roundtrip() {
        let repo = setup().await;
        let created = repo
            .create("John Doe", "john@example.com", "+1234", "Hi there")
            .await
            .unwrap();

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.full_name, "John Doe");

        let updated = repo
            .update(created.id, "Jane Doe", "jane@example.com", "+1234", "Hi")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.full_name, "Jane Doe");

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_by_name_and_email() {
        let repo = setup().await;
        repo.create("John Doe", "john@a.com", "1", "x").await.unwrap();
        repo.create("Jane Roe", "jane@b.com", "2", "y").await.unwrap();

        let params = ContactListParams {
            full_name: Some("doe".to_string()),
            ..Default::default()
        };
        let (messages, total) = repo.list(&params).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(messages[0].full_name, "John Doe");

        let params = ContactListParams {
            email: Some("@b.com".to_string()),
            ..Default::default()
        };
        let (messages, total) = repo.list(&params).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(messages[0].full_name, "Jane Roe");
    }

    #[tokio::test]
    async fn list_filters_by_phone_substring() {
        let repo = setup().await;
        repo.create("John Doe", "john@a.com", "+62 812 1111", "x").await.unwrap();
        repo.create("Jane Roe", "jane@b.com", "+62 813 2222", "y").await.unwrap();

        let params = ContactListParams {
            phone_number: Some("813".to_string()),
            ..Default::default()
        };
        let (messages, total) = repo.list(&params).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(messages[0].full_name, "Jane Roe");
    }

    #[tokio::test]
    async fn list_filters_by_update_window() {
        use chrono::TimeZone;

        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let repo = SqlxContactRepository::new(pool.clone());

        let stale = repo.create("Old Sender", "old@a.com", "1", "x").await.unwrap();
        repo.create("New Sender", "new@b.com", "2", "y").await.unwrap();

        sqlx::query("UPDATE contact_messages SET updated_at = ? WHERE id = ?")
            .bind(Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap())
            .bind(stale.id)
            .execute(&pool)
            .await
            .unwrap();

        let window = DateWindow::from_bounds(Some("2020-01-01"), Some("2020-01-02"))
            .unwrap()
            .unwrap();
        let params = ContactListParams {
            updated: Some(window),
            ..Default::default()
        };
        let (messages, total) = repo.list(&params).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(messages[0].full_name, "Old Sender");
    }
}
