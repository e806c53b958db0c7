//! Domain models
//!
//! Flat entity records plus the input types used by the services for
//! creates and partial updates.

pub mod admin;
pub mod blog;
pub mod business;
pub mod contact;
pub mod document;
pub mod media;

pub use admin::Admin;
pub use blog::{Blog, CreateBlogInput, UpdateBlogInput};
pub use business::{
    Business, BusinessItem, CreateBusinessInput, CreateBusinessItemInput, ItemKind,
    UpdateBusinessInput, UpdateBusinessItemInput,
};
pub use contact::{ContactMessage, CreateContactInput, UpdateContactInput};
pub use document::{CreateDocumentInput, Document, UpdateDocumentInput, DOCUMENT_CATEGORIES};
pub use media::{CreateMediaInput, Media, UpdateMediaInput};
