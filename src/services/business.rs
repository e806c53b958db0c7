//! Business service
//!
//! CRUD over businesses and their attached items (products, projects, and
//! services). Item operations are kind-scoped: the same service methods
//! back all three item endpoints, with the kind supplied by the router.

use std::sync::Arc;

use super::slug::generate_slug;
use super::ServiceError;
use crate::db::repositories::{
    BusinessItemListParams, BusinessListParams, BusinessRepository,
};
use crate::models::{
    Business, BusinessItem, CreateBusinessInput, CreateBusinessItemInput, ItemKind,
    UpdateBusinessInput, UpdateBusinessItemInput,
};

/// Business and business-item service
pub struct BusinessService {
    businesses: Arc<dyn BusinessRepository>,
}

impl BusinessService {
    pub fn new(businesses: Arc<dyn BusinessRepository>) -> Self {
        Self { businesses }
    }

    /// List businesses with the total match count
    pub async fn list(
        &self,
        params: &BusinessListParams,
    ) -> Result<(Vec<Business>, i64), ServiceError> {
        Ok(self.businesses.list(params).await?)
    }

    /// Get a business by slug
    pub async fn get(&self, slug: &str) -> Result<Business, ServiceError> {
        self.businesses
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Business not found".to_string()))
    }

    /// Create a business
    pub async fn create(&self, input: CreateBusinessInput) -> Result<Business, ServiceError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation("Title is required".to_string()));
        }

        let slug = self.derive_slug(title, None).await?;
        Ok(self
            .businesses
            .create(
                title,
                &slug,
                input.description.trim(),
                input.image_header_url.as_deref(),
                input.product_header_url.as_deref(),
            )
            .await?)
    }

    /// Apply a partial update to a business addressed by slug
    pub async fn update(
        &self,
        slug: &str,
        input: UpdateBusinessInput,
    ) -> Result<Business, ServiceError> {
        let existing = self.get(slug).await?;

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
        let new_slug = if input.title.is_some() {
            self.derive_slug(&title, Some(existing.id)).await?
        } else {
            existing.slug
        };
        let description = input.description.unwrap_or(existing.description);
        let image_header_url = input.image_header_url.or(existing.image_header_url);
        let product_header_url = input.product_header_url.or(existing.product_header_url);

        self.businesses
            .update(
                existing.id,
                &title,
                &new_slug,
                &description,
                image_header_url.as_deref(),
                product_header_url.as_deref(),
            )
            .await?
            .ok_or_else(|| ServiceError::NotFound("Business not found".to_string()))
    }

    /// Delete a business by slug, cascading to its items
    pub async fn delete(&self, slug: &str) -> Result<(), ServiceError> {
        let existing = self.get(slug).await?;
        if !self.businesses.delete(existing.id).await? {
            return Err(ServiceError::NotFound("Business not found".to_string()));
        }
        Ok(())
    }

    /// List items of one kind with the total match count
    pub async fn list_items(
        &self,
        kind: ItemKind,
        params: &BusinessItemListParams,
    ) -> Result<(Vec<BusinessItem>, i64), ServiceError> {
        Ok(self.businesses.list_items(kind, params).await?)
    }

    /// Get an item of one kind by slug
    pub async fn get_item(&self, kind: ItemKind, slug: &str) -> Result<BusinessItem, ServiceError> {
        self.businesses
            .get_item(kind, slug)
            .await?
            .ok_or_else(|| item_not_found(kind))
    }

    /// Create an item attached to an existing business
    pub async fn create_item(
        &self,
        kind: ItemKind,
        input: CreateBusinessItemInput,
    ) -> Result<BusinessItem, ServiceError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation("Title is required".to_string()));
        }
        if self.businesses.get_by_id(input.business_id).await?.is_none() {
            return Err(ServiceError::NotFound("Business not found".to_string()));
        }

        let slug = self.derive_item_slug(kind, title, None).await?;
        Ok(self
            .businesses
            .create_item(
                kind,
                title,
                &slug,
                input.description.trim(),
                &input.media_urls,
                input.business_id,
            )
            .await?)
    }

    /// Apply a partial update to an item addressed by kind and slug
    pub async fn update_item(
        &self,
        kind: ItemKind,
        slug: &str,
        input: UpdateBusinessItemInput,
    ) -> Result<BusinessItem, ServiceError> {
        let existing = self.get_item(kind, slug).await?;

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
        let new_slug = if input.title.is_some() {
            self.derive_item_slug(kind, &title, Some(existing.id)).await?
        } else {
            existing.slug
        };
        let description = input.description.unwrap_or(existing.description);
        let media_urls = input.media_urls.unwrap_or(existing.media_urls);
        let business_id = match input.business_id {
            Some(id) => {
                if self.businesses.get_by_id(id).await?.is_none() {
                    return Err(ServiceError::NotFound("Business not found".to_string()));
                }
                id
            }
            None => existing.business_id,
        };

        self.businesses
            .update_item(
                existing.id,
                &title,
                &new_slug,
                &description,
                &media_urls,
                business_id,
            )
            .await?
            .ok_or_else(|| item_not_found(kind))
    }

    /// Delete an item of one kind by slug
    pub async fn delete_item(&self, kind: ItemKind, slug: &str) -> Result<(), ServiceError> {
        if !self.businesses.delete_item(kind, slug).await? {
            return Err(item_not_found(kind));
        }
        Ok(())
    }

    async fn derive_slug(
        &self,
        title: &str,
        exclude_id: Option<i64>,
    ) -> Result<String, ServiceError> {
        let slug = generate_slug(title);
        if slug.is_empty() {
            return Err(ServiceError::Validation(
                "Title must contain at least one alphanumeric character".to_string(),
            ));
        }
        if self.businesses.exists_by_slug(&slug, exclude_id).await? {
            return Err(ServiceError::Duplicate(
                "A business with this title already exists".to_string(),
            ));
        }
        Ok(slug)
    }

    async fn derive_item_slug(
        &self,
        kind: ItemKind,
        title: &str,
        exclude_id: Option<i64>,
    ) -> Result<String, ServiceError> {
        let slug = generate_slug(title);
        if slug.is_empty() {
            return Err(ServiceError::Validation(
                "Title must contain at least one alphanumeric character".to_string(),
            ));
        }
        if self
            .businesses
            .item_exists_by_slug(kind, &slug, exclude_id)
            .await?
        {
            return Err(ServiceError::Duplicate(format!(
                "A {} with this title already exists",
                kind
            )));
        }
        Ok(slug)
    }
}

fn item_not_found(kind: ItemKind) -> ServiceError {
    ServiceError::NotFound(format!("{} not found", capitalized(kind)))
}

fn capitalized(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Product => "Product",
        ItemKind::Project => "Project",
        ItemKind::Service => "Service",
    }
}
