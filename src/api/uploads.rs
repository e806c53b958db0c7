//! File upload endpoint
//!
//! Accepts multipart form data, stages each file to a temp path, hands it to
//! the storage collaborator, and catalogs the stored URL as a media record.
//! The response lists the created records in upload order.

use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use std::path::Path;

use super::middleware::{ApiError, AppState, AuthenticatedAdmin};
use super::responses::Envelope;
use crate::models::{CreateMediaInput, Media};
use crate::services::storage::format_size;

pub fn router() -> Router<AppState> {
    Router::new().route("/uploads", post(upload))
}

async fn upload(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    mut multipart: Multipart,
) -> Result<Json<Envelope<Vec<Media>>>, ApiError> {
    let mut inputs = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            // Non-file form fields are ignored
            continue;
        };

        let content_type = field.content_type().unwrap_or("").to_string();
        if !state.upload.is_type_allowed(&content_type) {
            return Err(ApiError::validation(format!(
                "File type '{}' is not allowed",
                content_type
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Failed to read upload: {}", e)))?;
        if bytes.len() as u64 > state.upload.max_file_size {
            return Err(ApiError::validation(format!(
                "File '{}' exceeds the {} limit",
                file_name,
                format_size(state.upload.max_file_size)
            )));
        }

        let staged = tempfile::NamedTempFile::new().map_err(|e| {
            tracing::error!("Failed to create staging file: {}", e);
            ApiError::internal()
        })?;
        tokio::fs::write(staged.path(), &bytes).await.map_err(|e| {
            tracing::error!("Failed to stage upload: {}", e);
            ApiError::internal()
        })?;

        let stored = state
            .storage
            .store(staged.path(), &file_name)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store upload '{}': {:#}", file_name, e);
                ApiError::internal()
            })?;

        inputs.push(CreateMediaInput {
            name: display_name(&file_name),
            url: stored.url,
            size: format_size(stored.size_bytes),
        });
    }

    if inputs.is_empty() {
        return Err(ApiError::validation("No files uploaded"));
    }

    let created = state.media.create_many(inputs, admin.id).await?;
    Ok(Json(Envelope::ok("Files uploaded successfully", created)))
}

/// Display name for the catalog: the original filename without its extension
fn display_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_strips_extension_only() {
        assert_eq!(display_name("Company Logo.png"), "Company Logo");
        assert_eq!(display_name("archive.tar.gz"), "archive.tar");
        assert_eq!(display_name("noext"), "noext");
    }
}
