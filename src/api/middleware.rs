//! Shared API state, error mapping, and authentication extraction

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use crate::config::{Config, UploadConfig};
use crate::db::repositories::{
    SqlxAdminRepository, SqlxBlogRepository, SqlxBusinessRepository, SqlxContactRepository,
    SqlxDocumentRepository, SqlxMediaRepository,
};
use crate::db::DbPool;
use crate::services::{
    AuthService, BlogService, BusinessService, ContactService, DocumentService, LocalObjectStorage,
    MailService, MediaService, ObjectStorage, ServiceError, TokenIssuer,
};

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub blogs: Arc<BlogService>,
    pub media: Arc<MediaService>,
    pub contacts: Arc<ContactService>,
    pub businesses: Arc<BusinessService>,
    pub documents: Arc<DocumentService>,
    pub storage: Arc<dyn ObjectStorage>,
    pub upload: UploadConfig,
}

impl AppState {
    /// Wire repositories and services for a pool and configuration
    pub fn new(pool: DbPool, config: &Config) -> Self {
        let tokens = Arc::new(TokenIssuer::new(&config.auth));
        let mail = Arc::new(MailService::new(config.smtp.clone()));
        let storage: Arc<dyn ObjectStorage> = Arc::new(LocalObjectStorage::new(
            config.upload.path.clone(),
            config.upload.public_base_url.clone(),
        ));

        Self {
            auth: Arc::new(AuthService::new(
                SqlxAdminRepository::boxed(pool.clone()),
                tokens,
            )),
            blogs: Arc::new(BlogService::new(SqlxBlogRepository::boxed(pool.clone()))),
            media: Arc::new(MediaService::new(SqlxMediaRepository::boxed(pool.clone()))),
            contacts: Arc::new(ContactService::new(
                SqlxContactRepository::boxed(pool.clone()),
                mail,
            )),
            businesses: Arc::new(BusinessService::new(SqlxBusinessRepository::boxed(
                pool.clone(),
            ))),
            documents: Arc::new(DocumentService::new(SqlxDocumentRepository::boxed(pool))),
            storage,
            upload: config.upload.clone(),
        }
    }
}

/// API error with an HTTP status and a stable machine-readable code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHORIZED",
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND",
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "VALIDATION_ERROR",
            message: message.into(),
        }
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "DUPLICATE",
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message: "Internal server error".to_string(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => Self::not_found(msg),
            ServiceError::Validation(msg) => Self::validation(msg),
            ServiceError::Duplicate(msg) => Self::duplicate(msg),
            ServiceError::Unauthorized(msg) => Self::unauthorized(msg),
            ServiceError::Internal(err) => {
                // Full cause chain stays in the logs, not in the response
                tracing::error!("Internal error: {:#}", err);
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "status": "error",
            "code": self.code,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Admin identity extracted from the Authorization header.
///
/// Using the extractor makes a route protected; public routes simply do not
/// take it.
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin {
    pub id: i64,
    pub username: String,
}

impl FromRequestParts<AppState> for AuthenticatedAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::unauthorized("Missing access token"))?;

        let claims = state.auth.authenticate(token)?;
        Ok(AuthenticatedAdmin {
            id: claims.sub,
            username: claims.username,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
