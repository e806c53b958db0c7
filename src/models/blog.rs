//! Blog model
//!
//! This module provides:
//! - `Blog` entity representing a post
//! - Input types for creating and updating posts
//!
//! The slug is always derived from the title; update inputs never carry a
//! slug of their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blog entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// URL-friendly slug derived from the title
    pub slug: String,
    /// Post body
    pub content: String,
    /// Author admin ID
    pub author_id: i64,
    /// Author username, populated by list/get queries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new blog post
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlogInput {
    pub title: String,
    pub content: String,
}

/// Input for updating an existing blog post (partial patch)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBlogInput {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl UpdateBlogInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some() || self.content.is_some()
    }
}
