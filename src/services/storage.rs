//! Object storage collaborator
//!
//! Uploaded file bytes are staged to temporary local storage by the HTTP
//! layer and handed to an `ObjectStorage` implementation which moves them to
//! their final location and returns the public URL. Only the URL is
//! persisted in the database.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::services::slug::generate_slug;

/// Result of storing a staged file
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Public URL of the stored file
    pub url: String,
    /// Size in bytes
    pub size_bytes: u64,
}

/// Storage backend for uploaded files
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Move a staged file into the store under a name derived from the
    /// original filename. Returns the public URL and size.
    async fn store(&self, staged: &Path, original_name: &str) -> Result<StoredObject>;
}

/// Local-disk storage backend.
///
/// Stands in for an external object store: files land in a served directory
/// and the URL is built from the configured public base URL.
pub struct LocalObjectStorage {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// Build the destination filename: slugified stem plus a millisecond
    /// timestamp so repeated uploads never collide on disk.
    fn destination_name(original_name: &str) -> String {
        let path = Path::new(original_name);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("upload");
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("bin");

        let mut slug = generate_slug(stem);
        if slug.is_empty() {
            slug = "upload".to_string();
        }

        format!("{}-{}.{}", slug, chrono::Utc::now().timestamp_millis(), ext)
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn store(&self, staged: &Path, original_name: &str) -> Result<StoredObject> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create upload directory: {:?}", self.dir))?;

        let file_name = Self::destination_name(original_name);
        let destination = self.dir.join(&file_name);

        // Copy instead of rename: the staging file may live on another
        // filesystem (tmpfs).
        let size_bytes = tokio::fs::copy(staged, &destination)
            .await
            .with_context(|| format!("Failed to store upload at {:?}", destination))?;

        let url = format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            file_name
        );

        Ok(StoredObject { url, size_bytes })
    }
}

/// Format a byte count the way sizes are persisted, e.g. "523 KB"
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{} MB", bytes / (1024 * 1024))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(535_552), "523 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3 MB");
    }

    #[test]
    fn destination_name_is_slugged_with_extension() {
        let name = LocalObjectStorage::destination_name("My Logo (Final).PNG");
        assert!(name.starts_with("my-logo-final-"));
        assert!(name.ends_with(".PNG"));
    }

    #[test]
    fn destination_name_handles_missing_stem() {
        let name = LocalObjectStorage::destination_name("???");
        assert!(name.starts_with("upload-"));
    }

    #[tokio::test]
    async fn stores_staged_file_and_builds_url() {
        let staging = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(staging.path(), b"hello").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "http://localhost:8080/uploads/");

        let stored = storage
            .store(staging.path(), "greeting.txt")
            .await
            .expect("store failed");

        assert_eq!(stored.size_bytes, 5);
        assert!(stored.url.starts_with("http://localhost:8080/uploads/greeting-"));
        assert!(stored.url.ends_with(".txt"));
    }
}
