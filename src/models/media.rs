//! Media model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Media asset entity
///
/// Only the URL of the stored object is persisted; the bytes live in the
/// storage collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    /// Unique identifier
    pub id: i64,
    /// Display name, unique across all media
    pub name: String,
    /// URL-friendly slug derived from the name
    pub slug: String,
    /// Public URL of the stored object
    pub url: String,
    /// Human-readable size, e.g. "523 KB"
    pub size: String,
    /// Uploader admin ID
    pub uploader_id: i64,
    /// Uploader username, populated by list/get queries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
}

/// Input for creating a media record
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMediaInput {
    pub name: String,
    pub url: String,
    pub size: String,
}

/// Input for updating a media record (partial patch)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMediaInput {
    pub name: Option<String>,
    pub url: Option<String>,
    pub size: Option<String>,
}
