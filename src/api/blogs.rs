//! Blog endpoints

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::middleware::{ApiError, AppState, AuthenticatedAdmin};
use super::parse_window;
use super::responses::{message_only, Envelope};
use crate::db::repositories::BlogListParams;
use crate::models::{Blog, CreateBlogInput, UpdateBlogInput};
use crate::services::query::{Pagination, SortOrder};

#[derive(Debug, Default, Deserialize)]
pub struct BlogQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub title: Option<String>,
    pub author_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub update_start_date: Option<String>,
    pub update_end_date: Option<String>,
    pub sort: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
}

impl BlogQuery {
    fn into_params(self) -> Result<BlogListParams, ApiError> {
        Ok(BlogListParams {
            title: self.title,
            author_id: self.author_id,
            created: parse_window(self.start_date.as_deref(), self.end_date.as_deref())?,
            updated: parse_window(
                self.update_start_date.as_deref(),
                self.update_end_date.as_deref(),
            )?,
            sort: self.sort,
            order: self.order,
            pagination: Pagination::new(self.page, self.limit),
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blogs", get(list).post(create))
        .route("/blogs/{id}", get(get_one).patch(update).delete(delete_one))
}

async fn list(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(query): Query<BlogQuery>,
) -> Result<Json<Envelope<Vec<Blog>>>, ApiError> {
    let params = query.into_params()?;
    let (blogs, total) = state.blogs.list(&params).await?;
    Ok(Json(Envelope::list("Blogs retrieved successfully", blogs, total)))
}

async fn get_one(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<Blog>>, ApiError> {
    let blog = state.blogs.get(id).await?;
    Ok(Json(Envelope::ok("Blog retrieved successfully", blog)))
}

async fn create(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Json(input): Json<CreateBlogInput>,
) -> Result<Json<Envelope<Blog>>, ApiError> {
    let blog = state.blogs.create(input, admin.id).await?;
    Ok(Json(Envelope::ok("Blog created successfully", blog)))
}

async fn update(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(input): Json<UpdateBlogInput>,
) -> Result<Json<Envelope<Blog>>, ApiError> {
    let blog = state.blogs.update(id, input).await?;
    Ok(Json(Envelope::ok("Blog updated successfully", blog)))
}

async fn delete_one(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.blogs.delete(id).await?;
    Ok(Json(message_only("Blog deleted successfully")))
}
