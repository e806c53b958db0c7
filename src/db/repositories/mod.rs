//! Database repositories
//!
//! Repository pattern implementations for database access. Each repository
//! handles CRUD operations for a specific entity; list queries are built
//! with the shared `ListFilter` so every entity applies filters, pagination,
//! and ordering the same way.

pub mod admin;
pub mod blog;
pub mod business;
pub mod contact;
pub mod document;
pub mod media;

pub use admin::{AdminRepository, SqlxAdminRepository};
pub use blog::{BlogListParams, BlogRepository, SqlxBlogRepository};
pub use business::{
    BusinessItemListParams, BusinessListParams, BusinessRepository, SqlxBusinessRepository,
};
pub use contact::{ContactListParams, ContactRepository, SqlxContactRepository};
pub use document::{DocumentListParams, DocumentRepository, SqlxDocumentRepository};
pub use media::{MediaListParams, MediaRepository, SqlxMediaRepository};

/// Whether a sqlx error is a store-enforced unique-constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation
    )
}
