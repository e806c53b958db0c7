//! Business and business-item endpoints
//!
//! Businesses live under `/business`. Their items share one handler set,
//! mounted three times at `/products`, `/projects`, and `/services` with the
//! kind injected as an extension by `items_router`.

use axum::extract::{Extension, Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::middleware::{ApiError, AppState, AuthenticatedAdmin};
use super::parse_window;
use super::responses::{message_only, Envelope};
use crate::db::repositories::{BusinessItemListParams, BusinessListParams};
use crate::models::{
    Business, BusinessItem, CreateBusinessInput, CreateBusinessItemInput, ItemKind,
    UpdateBusinessInput, UpdateBusinessItemInput,
};
use crate::services::query::{Pagination, SortOrder};

#[derive(Debug, Default, Deserialize)]
pub struct BusinessQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
}

impl BusinessQuery {
    fn into_params(self) -> Result<BusinessListParams, ApiError> {
        Ok(BusinessListParams {
            title: self.title,
            created: parse_window(self.start_date.as_deref(), self.end_date.as_deref())?,
            sort: self.sort,
            order: self.order,
            pagination: Pagination::new(self.page, self.limit),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub title: Option<String>,
    pub business_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
}

impl ItemQuery {
    fn into_params(self) -> Result<BusinessItemListParams, ApiError> {
        Ok(BusinessItemListParams {
            title: self.title,
            business_id: self.business_id,
            created: parse_window(self.start_date.as_deref(), self.end_date.as_deref())?,
            sort: self.sort,
            order: self.order,
            pagination: Pagination::new(self.page, self.limit),
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/business", get(list).post(create))
        .route(
            "/business/{slug}",
            get(get_one).patch(update).delete(delete_one),
        )
}

/// Item routes for one kind, to be nested at the kind's path
pub fn items_router(kind: ItemKind) -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route(
            "/{slug}",
            get(get_item).patch(update_item).delete(delete_item),
        )
        .layer(Extension(kind))
}

async fn list(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(query): Query<BusinessQuery>,
) -> Result<Json<Envelope<Vec<Business>>>, ApiError> {
    let params = query.into_params()?;
    let (businesses, total) = state.businesses.list(&params).await?;
    Ok(Json(Envelope::list(
        "Businesses retrieved successfully",
        businesses,
        total,
    )))
}

async fn get_one(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
) -> Result<Json<Envelope<Business>>, ApiError> {
    let business = state.businesses.get(&slug).await?;
    Ok(Json(Envelope::ok("Business retrieved successfully", business)))
}

async fn create(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(input): Json<CreateBusinessInput>,
) -> Result<Json<Envelope<Business>>, ApiError> {
    let business = state.businesses.create(input).await?;
    Ok(Json(Envelope::ok("Business created successfully", business)))
}

async fn update(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
    Json(input): Json<UpdateBusinessInput>,
) -> Result<Json<Envelope<Business>>, ApiError> {
    let business = state.businesses.update(&slug, input).await?;
    Ok(Json(Envelope::ok("Business updated successfully", business)))
}

async fn delete_one(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.businesses.delete(&slug).await?;
    Ok(Json(message_only("Business deleted successfully")))
}

async fn list_items(
    State(state): State<AppState>,
    Extension(kind): Extension<ItemKind>,
    _admin: AuthenticatedAdmin,
    Query(query): Query<ItemQuery>,
) -> Result<Json<Envelope<Vec<BusinessItem>>>, ApiError> {
    let params = query.into_params()?;
    let (items, total) = state.businesses.list_items(kind, &params).await?;
    Ok(Json(Envelope::list(
        format!("{}s retrieved successfully", capitalized(kind)),
        items,
        total,
    )))
}

async fn get_item(
    State(state): State<AppState>,
    Extension(kind): Extension<ItemKind>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
) -> Result<Json<Envelope<BusinessItem>>, ApiError> {
    let item = state.businesses.get_item(kind, &slug).await?;
    Ok(Json(Envelope::ok(
        format!("{} retrieved successfully", capitalized(kind)),
        item,
    )))
}

async fn create_item(
    State(state): State<AppState>,
    Extension(kind): Extension<ItemKind>,
    _admin: AuthenticatedAdmin,
    Json(input): Json<CreateBusinessItemInput>,
) -> Result<Json<Envelope<BusinessItem>>, ApiError> {
    let item = state.businesses.create_item(kind, input).await?;
    Ok(Json(Envelope::ok(
        format!("{} created successfully", capitalized(kind)),
        item,
    )))
}

async fn update_item(
    State(state): State<AppState>,
    Extension(kind): Extension<ItemKind>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
    Json(input): Json<UpdateBusinessItemInput>,
) -> Result<Json<Envelope<BusinessItem>>, ApiError> {
    let item = state.businesses.update_item(kind, &slug, input).await?;
    Ok(Json(Envelope::ok(
        format!("{} updated successfully", capitalized(kind)),
        item,
    )))
}

async fn delete_item(
    State(state): State<AppState>,
    Extension(kind): Extension<ItemKind>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.businesses.delete_item(kind, &slug).await?;
    Ok(Json(message_only(format!(
        "{} deleted successfully",
        capitalized(kind)
    ))))
}

fn capitalized(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Product => "Product",
        ItemKind::Project => "Project",
        ItemKind::Service => "Service",
    }
}
