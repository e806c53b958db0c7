//! Contact-us endpoints
//!
//! Submission is public (the site's contact form posts here); reading and
//! managing messages is admin-only.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::middleware::{ApiError, AppState, AuthenticatedAdmin};
use super::parse_window;
use super::responses::{message_only, Envelope};
use crate::db::repositories::ContactListParams;
use crate::models::{ContactMessage, CreateContactInput, UpdateContactInput};
use crate::services::query::{Pagination, SortOrder};

#[derive(Debug, Default, Deserialize)]
pub struct ContactQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub update_start_date: Option<String>,
    pub update_end_date: Option<String>,
    pub sort: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
}

impl ContactQuery {
    fn into_params(self) -> Result<ContactListParams, ApiError> {
        Ok(ContactListParams {
            full_name: self.full_name,
            email: self.email,
            phone_number: self.phone_number,
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

/// Public route: anyone may submit a message
pub fn public_router() -> Router<AppState> {
    Router::new().route("/contact-us", post(create))
}

/// Admin routes for reading and managing messages
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/contact-us", get(list))
        .route(
            "/contact-us/{id}",
            get(get_one).patch(update).delete(delete_one),
        )
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateContactInput>,
) -> Result<Json<Envelope<ContactMessage>>, ApiError> {
    let message = state.contacts.create(input).await?;
    Ok(Json(Envelope::ok("Message sent successfully", message)))
}

async fn list(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(query): Query<ContactQuery>,
) -> Result<Json<Envelope<Vec<ContactMessage>>>, ApiError> {
    let params = query.into_params()?;
    let (messages, total) = state.contacts.list(&params).await?;
    Ok(Json(Envelope::list(
        "Contact messages retrieved successfully",
        messages,
        total,
    )))
}

async fn get_one(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<ContactMessage>>, ApiError> {
    let message = state.contacts.get(id).await?;
    Ok(Json(Envelope::ok("Contact message retrieved successfully", message)))
}

async fn update(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(input): Json<UpdateContactInput>,
) -> Result<Json<Envelope<ContactMessage>>, ApiError> {
    let message = state.contacts.update(id, input).await?;
    Ok(Json(Envelope::ok("Contact message updated successfully", message)))
}

async fn delete_one(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.contacts.delete(id).await?;
    Ok(Json(message_only("Contact message deleted successfully")))
}
