//! Media catalog endpoints
//!
//! Media rows are addressed by slug. The list response carries `newest`,
//! the readable timestamp of the most recent matching upload.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::middleware::{ApiError, AppState, AuthenticatedAdmin};
use super::parse_window;
use super::responses::{message_only, Envelope};
use crate::db::repositories::MediaListParams;
use crate::models::{CreateMediaInput, Media, UpdateMediaInput};
use crate::services::query::{Pagination, SortOrder};

#[derive(Debug, Default, Deserialize)]
pub struct MediaQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub name: Option<String>,
    pub uploader_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
}

impl MediaQuery {
    fn into_params(self) -> Result<MediaListParams, ApiError> {
        Ok(MediaListParams {
            name: self.name,
            uploader_id: self.uploader_id,
            uploaded: parse_window(self.start_date.as_deref(), self.end_date.as_deref())?,
            sort: self.sort,
            order: self.order,
            pagination: Pagination::new(self.page, self.limit),
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/media", get(list).post(create))
        .route("/media/{slug}", get(get_one).patch(update).delete(delete_one))
}

async fn list(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(query): Query<MediaQuery>,
) -> Result<Json<Envelope<Vec<Media>>>, ApiError> {
    let params = query.into_params()?;
    let page = state.media.list(&params).await?;
    Ok(Json(
        Envelope::list("Media retrieved successfully", page.items, page.total)
            .with_newest(page.newest),
    ))
}

async fn get_one(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
) -> Result<Json<Envelope<Media>>, ApiError> {
    let media = state.media.get(&slug).await?;
    Ok(Json(Envelope::ok("Media retrieved successfully", media)))
}

async fn create(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Json(input): Json<CreateMediaInput>,
) -> Result<Json<Envelope<Media>>, ApiError> {
    let media = state.media.create(input, admin.id).await?;
    Ok(Json(Envelope::ok("Media created successfully", media)))
}

async fn update(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
    Json(input): Json<UpdateMediaInput>,
) -> Result<Json<Envelope<Media>>, ApiError> {
    let media = state.media.update(&slug, input).await?;
    Ok(Json(Envelope::ok("Media updated successfully", media)))
}

async fn delete_one(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.media.delete(&slug).await?;
    Ok(Json(message_only("Media deleted successfully")))
}
