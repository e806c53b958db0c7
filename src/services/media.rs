//! Media service
//!
//! Media records sit on top of the storage collaborator: the file bytes are
//! already stored when a record is created, so this service only manages the
//! catalog rows. Display names are unique; a taken name is retried with a
//! numeric suffix ("Logo", "Logo(1)", "Logo(2)", ...) until the store
//! accepts it, relying on the unique constraint rather than a pre-check.

use std::sync::Arc;

use super::slug::generate_slug;
use super::ServiceError;
use crate::db::repositories::media::MediaPage;
use crate::db::repositories::{MediaListParams, MediaRepository};
use crate::models::{CreateMediaInput, Media, UpdateMediaInput};

/// Cap on dedup retries before giving up on a name
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Media catalog service
pub struct MediaService {
    media: Arc<dyn MediaRepository>,
}

impl MediaService {
    pub fn new(media: Arc<dyn MediaRepository>) -> Self {
        Self { media }
    }

    /// List media with the total count and newest upload timestamp
    pub async fn list(&self, params: &MediaListParams) -> Result<MediaPage, ServiceError> {
        Ok(self.media.list(params).await?)
    }

    /// Get a media record by slug
    pub async fn get(&self, slug: &str) -> Result<Media, ServiceError> {
        self.media
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Media not found".to_string()))
    }

    /// Create a media record, deduplicating the name with numeric suffixes
    pub async fn create(
        &self,
        input: CreateMediaInput,
        uploader_id: i64,
    ) -> Result<Media, ServiceError> {
        let base = valid_name(&input.name)?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = if attempt == 0 {
                base.clone()
            } else {
                format!("{}({})", base, attempt)
            };
            let slug = generate_slug(&candidate);

            if let Some(media) = self
                .media
                .try_create(&candidate, &slug, &input.url, &input.size, uploader_id)
                .await?
            {
                if attempt > 0 {
                    tracing::debug!("Media name '{}' taken, stored as '{}'", base, candidate);
                }
                return Ok(media);
            }
        }

        Err(ServiceError::Duplicate(format!(
            "Could not find a free name for '{}'",
            base
        )))
    }

    /// Create records for a batch of uploads, in order
    pub async fn create_many(
        &self,
        inputs: Vec<CreateMediaInput>,
        uploader_id: i64,
    ) -> Result<Vec<Media>, ServiceError> {
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            created.push(self.create(input, uploader_id).await?);
        }
        Ok(created)
    }

    /// Apply a partial update to a media record addressed by slug.
    ///
    /// Renames dedup the same way creates do: a conflicting new name is
    /// retried with numeric suffixes until the store accepts it.
    pub async fn update(&self, slug: &str, input: UpdateMediaInput) -> Result<Media, ServiceError> {
        let existing = self.get(slug).await?;

        let base = match &input.name {
            Some(name) => valid_name(name)?,
            None => existing.name.clone(),
        };
        let url = input.url.unwrap_or(existing.url);
        let size = input.size.unwrap_or(existing.size);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = if attempt == 0 {
                base.clone()
            } else {
                format!("{}({})", base, attempt)
            };
            // Keeping the existing name keeps the existing slug too
            let new_slug = if candidate == existing.name {
                existing.slug.clone()
            } else {
                generate_slug(&candidate)
            };

            if let Some(media) = self
                .media
                .try_update(existing.id, &candidate, &new_slug, &url, &size)
                .await?
            {
                if attempt > 0 {
                    tracing::debug!("Media name '{}' taken, stored as '{}'", base, candidate);
                }
                return Ok(media);
            }
        }

        Err(ServiceError::Duplicate(format!(
            "Could not find a free name for '{}'",
            base
        )))
    }

    /// Delete a media record by slug
    pub async fn delete(&self, slug: &str) -> Result<(), ServiceError> {
        if !self.media.delete_by_slug(slug).await? {
            return Err(ServiceError::NotFound("Media not found".to_string()));
        }
        Ok(())
    }
}

fn valid_name(name: &str) -> Result<String, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation("Name is required".to_string()));
    }
    if generate_slug(name).is_empty() {
        return Err(ServiceError::Validation(
            "Name must contain at least one alphanumeric character".to_string(),
        ));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{AdminRepository, SqlxAdminRepository, SqlxMediaRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> (MediaService, i64) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let admin = SqlxAdminRepository::new(pool.clone())
            .create("admin1", "admin1@mail.com", "hash")
            .await
            .unwrap();
        (MediaService::new(SqlxMediaRepository::boxed(pool)), admin.id)
    }

    fn input(name: &str) -> CreateMediaInput {
        CreateMediaInput {
            name: name.to_string(),
            url: format!("http://x/{}.png", name.to_lowercase()),
            size: "1 KB".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_names_get_numeric_suffixes() {
        let (service, uploader) = setup().await;

        let first = service.create(input("Logo"), uploader).await.unwrap();
        let second = service.create(input("Logo"), uploader).await.unwrap();
        let third = service.create(input("Logo"), uploader).await.unwrap();

        assert_eq!(first.name, "Logo");
        assert_eq!(second.name, "Logo(1)");
        assert_eq!(third.name, "Logo(2)");

        assert_eq!(first.slug, "logo");
        assert_eq!(second.slug, "logo-1");
        assert_eq!(third.slug, "logo-2");
    }

    #[tokio::test]
    async fn suffix_counter_skips_taken_candidates() {
        let (service, uploader) = setup().await;

        // "Logo(1)" claimed up front; a later "Logo" dup must step past it
        service.create(input("Logo(1)"), uploader).await.unwrap();
        service.create(input("Logo"), uploader).await.unwrap();
        let third = service.create(input("Logo"), uploader).await.unwrap();
        assert_eq!(third.name, "Logo(2)");
    }

    #[tokio::test]
    async fn batch_creation_preserves_order_and_dedups() {
        let (service, uploader) = setup().await;
        let created = service
            .create_many(vec![input("Photo"), input("Photo"), input("Banner")], uploader)
            .await
            .unwrap();

        let names: Vec<&str> = created.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Photo", "Photo(1)", "Banner"]);
    }

    #[tokio::test]
    async fn rename_conflict_gets_a_suffix() {
        let (service, uploader) = setup().await;
        service.create(input("Logo"), uploader).await.unwrap();
        let banner = service.create(input("Banner"), uploader).await.unwrap();

        let renamed = service
            .update(
                &banner.slug,
                UpdateMediaInput {
                    name: Some("Logo".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Logo(1)");
        assert_eq!(renamed.slug, "logo-1");
    }

    #[tokio::test]
    async fn update_without_rename_keeps_name_and_slug() {
        let (service, uploader) = setup().await;
        let logo = service.create(input("Logo"), uploader).await.unwrap();

        let updated = service
            .update(
                &logo.slug,
                UpdateMediaInput {
                    size: Some("2 KB".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Logo");
        assert_eq!(updated.slug, "logo");
        assert_eq!(updated.size, "2 KB");
    }

    #[tokio::test]
    async fn rename_updates_slug() {
        let (service, uploader) = setup().await;
        let media = service.create(input("Old Logo"), uploader).await.unwrap();
        assert_eq!(media.slug, "old-logo");

        let renamed = service
            .update(
                "old-logo",
                UpdateMediaInput {
                    name: Some("New Logo".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "New Logo");
        assert_eq!(renamed.slug, "new-logo");

        assert!(matches!(service.get("old-logo").await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_exposes_newest_upload() {
        let (service, uploader) = setup().await;
        service.create(input("A"), uploader).await.unwrap();
        let latest = service.create(input("B"), uploader).await.unwrap();

        let page = service.list(&MediaListParams::default()).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.newest, Some(latest.uploaded_at));
    }

    #[tokio::test]
    async fn blank_name_rejected() {
        let (service, uploader) = setup().await;
        let result = service.create(input("   "), uploader).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn missing_media_is_not_found() {
        let (service, _) = setup().await;
        assert!(matches!(service.get("nope").await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.delete("nope").await, Err(ServiceError::NotFound(_))));
    }
}
