//! Business logic services
//!
//! Each domain service composes the query helpers with repository calls to
//! implement list/get/create/update/delete, raising a typed error on failed
//! lookups instead of returning empty values.

pub mod auth;
pub mod blog;
pub mod business;
pub mod contact;
pub mod document;
pub mod mail;
pub mod media;
pub mod password;
pub mod query;
pub mod slug;
pub mod storage;
pub mod token;

pub use auth::AuthService;
pub use blog::BlogService;
pub use business::BusinessService;
pub use contact::ContactService;
pub use document::DocumentService;
pub use mail::MailService;
pub use media::MediaService;
pub use storage::{LocalObjectStorage, ObjectStorage, StoredObject};
pub use token::{TokenIssuer, TokenPair};

/// Error type shared by all domain services
///
/// Mirrors the backend's error taxonomy: Not Found (absent row), Validation
/// and Duplicate (bad request), Unauthorized (credential/token failures),
/// and Internal (unexpected persistence failure with the original message
/// attached).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Requested row absent by id or slug
    #[error("{0}")]
    NotFound(String),

    /// Invalid input
    #[error("{0}")]
    Validation(String),

    /// Duplicate unique field (e.g. slug/title collision)
    #[error("{0}")]
    Duplicate(String),

    /// Missing/invalid credentials or tokens
    #[error("{0}")]
    Unauthorized(String),

    /// Unexpected persistence failure
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
