//! Blog service
//!
//! CRUD over blog posts. Slugs are always derived from the title and
//! re-derived on rename; a title whose slug collides with another post is
//! rejected before the insert.

use std::sync::Arc;

use super::slug::generate_slug;
use super::ServiceError;
use crate::db::repositories::{BlogListParams, BlogRepository};
use crate::models::{Blog, CreateBlogInput, UpdateBlogInput};

/// Blog post service
pub struct BlogService {
    blogs: Arc<dyn BlogRepository>,
}

impl BlogService {
    pub fn new(blogs: Arc<dyn BlogRepository>) -> Self {
        Self { blogs }
    }

    /// List posts with the total match count
    pub async fn list(&self, params: &BlogListParams) -> Result<(Vec<Blog>, i64), ServiceError> {
        Ok(self.blogs.list(params).await?)
    }

    /// Get a post by ID
    pub async fn get(&self, id: i64) -> Result<Blog, ServiceError> {
        self.blogs
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Blog not found".to_string()))
    }

    /// Create a post authored by the given admin
    pub async fn create(
        &self,
        input: CreateBlogInput,
        author_id: i64,
    ) -> Result<Blog, ServiceError> {
        let title = input.title.trim();
        let content = input.content.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation("Title is required".to_string()));
        }
        if content.is_empty() {
            return Err(ServiceError::Validation("Content is required".to_string()));
        }

        let slug = self.derive_slug(title, None).await?;
        Ok(self.blogs.create(title, &slug, content, author_id).await?)
    }

    /// Apply a partial update to a post
    pub async fn update(&self, id: i64, input: UpdateBlogInput) -> Result<Blog, ServiceError> {
        if !input.has_changes() {
            return Err(ServiceError::Validation("No fields to update".to_string()));
        }

        let existing = self.get(id).await?;

        let title = match &input.title {
            Some(title) => {
                let title = title.trim();
                if title.is_empty() {
                    return Err(ServiceError::Validation("Title is required".to_string()));
                }
                title.to_string()
            }
            None => existing.title,
        };
        let content = match &input.content {
            Some(content) => content.trim().to_string(),
            None => existing.content,
        };

        // Re-derive the slug whenever the title changed
        let slug = if input.title.is_some() {
            self.derive_slug(&title, Some(id)).await?
        } else {
            existing.slug
        };

        self.blogs
            .update(id, &title, &slug, &content)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Blog not found".to_string()))
    }

    /// Delete a post
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.blogs.delete(id).await? {
            return Err(ServiceError::NotFound("Blog not found".to_string()));
        }
        Ok(())
    }

    async fn derive_slug(&self, title: &str, exclude_id: Option<i64>) -> Result<String, ServiceError> {
        let slug = generate_slug(title);
        if slug.is_empty() {
            return Err(ServiceError::Validation(
                "Title must contain at least one alphanumeric character".to_string(),
            ));
        }
        if self.blogs.exists_by_slug(&slug, exclude_id).await? {
            return Err(ServiceError::Duplicate(
                "A blog with this title already exists".to_string(),
            ));
        }
        Ok(slug)
    }
}
