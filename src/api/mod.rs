//! HTTP API
//!
//! Route handlers, the shared response envelope, and router assembly. The
//! API splits into public routes (login, refresh, contact submission) and
//! protected routes, which require a Bearer access token via the
//! `AuthenticatedAdmin` extractor.

pub mod auth;
pub mod blogs;
pub mod business;
pub mod contact;
pub mod documents;
pub mod media;
pub mod middleware;
pub mod responses;
pub mod uploads;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::models::ItemKind;
use crate::services::query::DateWindow;

pub use middleware::{ApiError, AppState, AuthenticatedAdmin};

/// Parse optional calendar-date bounds into a window, as a request error
pub(crate) fn parse_window(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<DateWindow>, ApiError> {
    DateWindow::from_bounds(start, end).map_err(ApiError::validation)
}

/// Assemble the full application router
pub fn build_router(state: AppState, server: &ServerConfig) -> anyhow::Result<Router> {
    let origin = server
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", server.cors_origin, e))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let api = Router::new()
        .merge(auth::public_router())
        .merge(contact::public_router())
        .merge(auth::protected_router())
        .merge(blogs::router())
        .merge(media::router())
        .merge(contact::protected_router())
        .merge(business::router())
        .nest("/products", business::items_router(ItemKind::Product))
        .nest("/projects", business::items_router(ItemKind::Project))
        .nest("/services", business::items_router(ItemKind::Service))
        .merge(documents::router())
        .merge(uploads::router());

    // Multipart bodies carry some framing overhead beyond the file bytes
    let body_limit = state.upload.max_file_size as usize + 1024 * 1024;
    let upload_dir = state.upload.path.clone();

    Ok(Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
