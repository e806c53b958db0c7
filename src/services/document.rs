//! Document service
//!
//! Company documents (permits, certifications, awards) with a fixed
//! category vocabulary and title-derived unique slugs.

use std::sync::Arc;

use super::slug::generate_slug;
use super::ServiceError;
use crate::db::repositories::{DocumentListParams, DocumentRepository};
use crate::models::{CreateDocumentInput, Document, UpdateDocumentInput, DOCUMENT_CATEGORIES};

/// Document service
pub struct DocumentService {
    documents: Arc<dyn DocumentRepository>,
}

impl DocumentService {
    pub fn new(documents: Arc<dyn DocumentRepository>) -> Self {
        Self { documents }
    }

    /// List documents with the total match count
    pub async fn list(
        &self,
        params: &DocumentListParams,
    ) -> Result<(Vec<Document>, i64), ServiceError> {
        if let Some(category) = params.category.as_deref() {
            validate_category(category)?;
        }
        Ok(self.documents.list(params).await?)
    }

    /// Get a document by ID
    pub async fn get(&self, id: i64) -> Result<Document, ServiceError> {
        self.documents
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Document not found".to_string()))
    }

    /// Create a document uploaded by the given admin
    pub async fn create(
        &self,
        input: CreateDocumentInput,
        uploader_id: i64,
    ) -> Result<Document, ServiceError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("Name is required".to_string()));
        }
        let category = normalize_category(&input.category)?;

        let slug = self.derive_slug(name, None).await?;
        Ok(self
            .documents
            .create(name, &slug, &category, &input.url, &input.size, uploader_id)
            .await?)
    }

    /// Apply a partial update to a document
    pub async fn update(
        &self,
        id: i64,
        input: UpdateDocumentInput,
    ) -> Result<Document, ServiceError> {
        let existing = self.get(id).await?;

        let name = match &input.name {
            Some(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(ServiceError::Validation("Name is required".to_string()));
                }
                name.to_string()
            }
            None => existing.name,
        };
        let slug = if input.name.is_some() {
            self.derive_slug(&name, Some(id)).await?
        } else {
            existing.slug
        };
        let category = match &input.category {
            Some(category) => normalize_category(category)?,
            None => existing.category,
        };
        let url = input.url.unwrap_or(existing.url);
        let size = input.size.unwrap_or(existing.size);

        self.documents
            .update(id, &name, &slug, &category, &url, &size)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Document not found".to_string()))
    }

    /// Delete a document
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.documents.delete(id).await? {
            return Err(ServiceError::NotFound("Document not found".to_string()));
        }
        Ok(())
    }

    async fn derive_slug(
        &self,
        name: &str,
        exclude_id: Option<i64>,
    ) -> Result<String, ServiceError> {
        let slug = generate_slug(name);
        if slug.is_empty() {
            return Err(ServiceError::Validation(
                "Name must contain at least one alphanumeric character".to_string(),
            ));
        }
        if self.documents.exists_by_slug(&slug, exclude_id).await? {
            return Err(ServiceError::Duplicate(
                "A document with this name already exists".to_string(),
            ));
        }
        Ok(slug)
    }
}

fn normalize_category(category: &str) -> Result<String, ServiceError> {
    let category = category.trim().to_lowercase();
    validate_category(&category)?;
    Ok(category)
}

fn validate_category(category: &str) -> Result<(), ServiceError> {
    if DOCUMENT_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(ServiceError::Validation(format!(
            "Invalid category '{}', expected one of: {}",
            category,
            DOCUMENT_CATEGORIES.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{AdminRepository, SqlxAdminRepository, SqlxDocumentRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> (DocumentService, i64) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let admin = SqlxAdminRepository::new(pool.clone())
            .create("admin1", "admin1@mail.com", "hash")
            .await
            .unwrap();
        (
            DocumentService::new(SqlxDocumentRepository::boxed(pool)),
            admin.id,
        )
    }

    fn input(name: &str, category: &str) -> CreateDocumentInput {
        CreateDocumentInput {
            name: name.to_string(),
            category: category.to_string(),
            url: "http://x/doc.pdf".to_string(),
            size: "523 KB".to_string(),
        }
    }

    #[tokio::test]
    async fn category_vocabulary_is_enforced() {
        let (service, uploader) = setup().await;

        for category in ["legality", "certification", "award"] {
            service
                .create(input(&format!("Doc {}", category), category), uploader)
                .await
                .unwrap();
        }

        let result = service.create(input("Doc X", "diploma"), uploader).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn category_is_normalized() {
        let (service, uploader) = setup().await;
        let doc = service.create(input("Permit", "  Legality "), uploader).await.unwrap();
        assert_eq!(doc.category, "legality");
    }

    #[tokio::test]
    async fn duplicate_name_rejected() {
        let (service, uploader) = setup().await;
        service.create(input("ISO 9001", "certification"), uploader).await.unwrap();

        let result = service.create(input("ISO 9001!", "certification"), uploader).await;
        assert!(matches!(result, Err(ServiceError::Duplicate(_))));
    }

    #[tokio::test]
    async fn update_recategorizes_and_renames() {
        let (service, uploader) = setup().await;
        let doc = service.create(input("Permit", "legality"), uploader).await.unwrap();

        let updated = service
            .update(
                doc.id,
                UpdateDocumentInput {
                    name: Some("Operating Permit".to_string()),
                    category: Some("certification".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.slug, "operating-permit");
        assert_eq!(updated.category, "certification");
    }

    #[tokio::test]
    async fn list_rejects_unknown_category_filter() {
        let (service, _) = setup().await;
        let params = DocumentListParams {
            category: Some("diploma".to_string()),
            ..Default::default()
        };
        assert!(matches!(service.list(&params).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let (service, _) = setup().await;
        assert!(matches!(service.get(42).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.delete(42).await, Err(ServiceError::NotFound(_))));
    }
}
