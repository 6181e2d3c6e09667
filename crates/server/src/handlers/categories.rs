//! Category handlers

use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::{Error, Result};
use crate::models::{Category, CategoryInput, CategoryPatch};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

/// GET /api/categories/
pub async fn list_categories(
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Json<Vec<Category>>> {
    info!("GET /api/categories/ - user {}", ctx.user_id());

    let categories = state.store.list_categories(ctx.user_id()).await?;

    Ok(Json(categories))
}

/// POST /api/categories/
pub async fn create_category(
    State(state): State<AppState>,
    ctx: Ctx,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    info!("POST /api/categories/ - user {}", ctx.user_id());

    input.validate().map_err(Error::BadRequest)?;

    let category = state.store.create_category(ctx.user_id(), &input).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/categories/{id}/
pub async fn get_category(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<i64>,
) -> Result<Json<Category>> {
    info!("GET /api/categories/{}/ - user {}", id, ctx.user_id());

    let category = state
        .store
        .get_category(ctx.user_id(), id)
        .await?
        .ok_or(Error::CategoryNotFound { id })?;

    Ok(Json(category))
}

/// PUT /api/categories/{id}/
pub async fn replace_category(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<i64>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>> {
    info!("PUT /api/categories/{}/ - user {}", id, ctx.user_id());

    input.validate().map_err(Error::BadRequest)?;

    let category = state
        .store
        .update_category(ctx.user_id(), id, &input)
        .await?
        .ok_or(Error::CategoryNotFound { id })?;

    Ok(Json(category))
}

/// PATCH /api/categories/{id}/
pub async fn patch_category(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<i64>,
    Json(patch): Json<CategoryPatch>,
) -> Result<Json<Category>> {
    info!("PATCH /api/categories/{}/ - user {}", id, ctx.user_id());

    patch.validate().map_err(Error::BadRequest)?;

    let category = state
        .store
        .patch_category(ctx.user_id(), id, &patch)
        .await?
        .ok_or(Error::CategoryNotFound { id })?;

    Ok(Json(category))
}

/// DELETE /api/categories/{id}/
pub async fn delete_category(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    info!("DELETE /api/categories/{}/ - user {}", id, ctx.user_id());

    let deleted = state.store.delete_category(ctx.user_id(), id).await?;
    if !deleted {
        return Err(Error::CategoryNotFound { id });
    }

    Ok(StatusCode::NO_CONTENT)
}
