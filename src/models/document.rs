//! Document model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document categories accepted by validation
pub const DOCUMENT_CATEGORIES: &[&str] = &["legality", "certification", "award"];

/// Document entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier
    pub id: i64,
    /// Document name
    pub name: String,
    /// URL-friendly slug derived from the name
    pub slug: String,
    /// Category (legality, certification, award)
    pub category: String,
    /// Public URL of the stored file
    pub url: String,
    /// Human-readable size, e.g. "523 KB"
    pub size: String,
    /// Uploader admin ID
    pub uploader_id: i64,
    /// Uploader username, populated by list/get queries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a document
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocumentInput {
    pub name: String,
    pub category: String,
    pub url: String,
    pub size: String,
}

/// Input for updating a document (partial patch)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDocumentInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub url: Option<String>,
    pub size: Option<String>,
}
