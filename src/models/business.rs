//! Business model
//!
//! This module provides:
//! - `Business` entity representing a line of business
//! - `BusinessItem` for the products, projects, and services attached to a
//!   business, distinguished by `ItemKind`
//! - Input types for creates and partial updates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Business entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    /// Unique identifier
    pub id: i64,
    /// Business title
    pub title: String,
    /// URL-friendly slug derived from the title
    pub slug: String,
    /// Description
    pub description: String,
    /// Header image URL
    pub image_header_url: Option<String>,
    /// Product page header image URL
    pub product_header_url: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Kind of item attached to a business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Product,
    Project,
    Service,
}

impl ItemKind {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Product => "product",
            ItemKind::Project => "project",
            ItemKind::Service => "service",
        }
    }

    /// Parse from the database string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "product" => Some(ItemKind::Product),
            "project" => Some(ItemKind::Project),
            "service" => Some(ItemKind::Service),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Product, project, or service attached to a business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessItem {
    /// Unique identifier
    pub id: i64,
    /// Item kind
    pub kind: ItemKind,
    /// Item title
    pub title: String,
    /// URL-friendly slug, unique per kind
    pub slug: String,
    /// Description
    pub description: String,
    /// Associated media URLs
    pub media_urls: Vec<String>,
    /// Owning business ID
    pub business_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a business
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBusinessInput {
    pub title: String,
    pub description: String,
    pub image_header_url: Option<String>,
    pub product_header_url: Option<String>,
}

/// Input for updating a business (partial patch)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBusinessInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_header_url: Option<String>,
    pub product_header_url: Option<String>,
}

/// Input for creating a business item
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBusinessItemInput {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub media_urls: Vec<String>,
    pub business_id: i64,
}

/// Input for updating a business item (partial patch)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBusinessItemInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub media_urls: Option<Vec<String>>,
    pub business_id: Option<i64>,
}
