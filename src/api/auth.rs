//! Authentication endpoints
//!
//! Login and refresh are public; logout requires a valid access token.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use super::middleware::{ApiError, AppState, AuthenticatedAdmin};
use super::responses::{message_only, Envelope};
use crate::services::TokenPair;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Routes that need no access token
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", post(refresh))
}

/// Routes that require a valid access token
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/auth/logout", post(logout))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Envelope<TokenPair>>, ApiError> {
    let pair = state.auth.login(&request.username, &request.password).await?;
    Ok(Json(Envelope::ok("Login successful", pair)))
}

async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<Envelope<TokenPair>>, ApiError> {
    let pair = state.auth.refresh(&request.refresh_token).await?;
    Ok(Json(Envelope::ok("Token refreshed successfully", pair)))
}

async fn logout(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.auth.logout(admin.id).await?;
    Ok(Json(message_only("Logout successful")))
}
