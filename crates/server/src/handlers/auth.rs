//! Auth handlers

use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::{Error, Result};
use crate::models::{validate_text, TokenPair, UserInfo, PASSWORD_MAX_LEN, USERNAME_MAX_LEN};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh: String,
}

/// POST /api/register/
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserInfo>)> {
    info!("POST /api/register/ - {}", req.username);

    validate_text("username", &req.username, USERNAME_MAX_LEN).map_err(Error::BadRequest)?;
    validate_text("password", &req.password, PASSWORD_MAX_LEN).map_err(Error::BadRequest)?;

    match state.auth.register(&req.username, &req.password).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(user.into()))),
        Err(e) => {
            warn!("Registration failed for {}: {}", req.username, e);
            Err(Error::BadRequest(e.to_string()))
        }
    }
}

/// POST /api/token/
pub async fn obtain_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenPair>> {
    info!("POST /api/token/ - {}", req.username);

    match state.auth.login(&req.username, &req.password).await {
        Ok((_, pair)) => Ok(Json(pair)),
        Err(e) => {
            warn!("Login failed for {}: {}", req.username, e);
            Err(Error::LoginFail)
        }
    }
}

/// POST /api/token/refresh/
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenPair>> {
    info!("POST /api/token/refresh/");

    match state.auth.refresh(&req.refresh).await {
        Ok(pair) => Ok(Json(pair)),
        Err(e) => {
            warn!("Token refresh failed: {}", e);
            Err(Error::RefreshFail)
        }
    }
}

/// POST /api/logout/
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> Result<StatusCode> {
    info!("POST /api/logout/");

    state.auth.revoke(&req.refresh).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/me/
pub async fn me(State(state): State<AppState>, ctx: Ctx) -> Result<Json<UserInfo>> {
    info!("GET /api/me/ - user {}", ctx.user_id());

    let user = state
        .auth
        .get_user(ctx.user_id())
        .await
        .map_err(|_| Error::AuthFailInvalidToken)?;

    Ok(Json(user))
}
