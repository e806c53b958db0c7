//! Document endpoints

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::middleware::{ApiError, AppState, AuthenticatedAdmin};
use super::parse_window;
use super::responses::{message_only, Envelope};
use crate::db::repositories::DocumentListParams;
use crate::models::{CreateDocumentInput, Document, UpdateDocumentInput};
use crate::services::query::{Pagination, SortOrder};

#[derive(Debug, Default, Deserialize)]
pub struct DocumentQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
}

impl DocumentQuery {
    fn into_params(self) -> Result<DocumentListParams, ApiError> {
        Ok(DocumentListParams {
            name: self.name,
            category: self.category,
            created: parse_window(self.start_date.as_deref(), self.end_date.as_deref())?,
            sort: self.sort,
            order: self.order,
            pagination: Pagination::new(self.page, self.limit),
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/documents", get(list).post(create))
        .route(
            "/documents/{id}",
            get(get_one).patch(update).delete(delete_one),
        )
}

async fn list(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(query): Query<DocumentQuery>,
) -> Result<Json<Envelope<Vec<Document>>>, ApiError> {
    let params = query.into_params()?;
    let (documents, total) = state.documents.list(&params).await?;
    Ok(Json(Envelope::list(
        "Documents retrieved successfully",
        documents,
        total,
    )))
}

async fn get_one(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<Document>>, ApiError> {
    let document = state.documents.get(id).await?;
    Ok(Json(Envelope::ok("Document retrieved successfully", document)))
}

async fn create(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Json(input): Json<CreateDocumentInput>,
) -> Result<Json<Envelope<Document>>, ApiError> {
    let document = state.documents.create(input, admin.id).await?;
    Ok(Json(Envelope::ok("Document created successfully", document)))
}

async fn update(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(input): Json<UpdateDocumentInput>,
) -> Result<Json<Envelope<Document>>, ApiError> {
    let document = state.documents.update(id, input).await?;
    Ok(Json(Envelope::ok("Document updated successfully", document)))
}

async fn delete_one(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.documents.delete(id).await?;
    Ok(Json(message_only("Document deleted successfully")))
}
