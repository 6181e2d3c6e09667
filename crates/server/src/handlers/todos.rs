//! Todo handlers

use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::{Error, Result};
use crate::models::{Todo, TodoInput, TodoPatch};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

/// GET /api/todos/
pub async fn list_todos(State(state): State<AppState>, ctx: Ctx) -> Result<Json<Vec<Todo>>> {
    info!("GET /api/todos/ - user {}", ctx.user_id());

    let todos = state.store.list_todos(ctx.user_id()).await?;

    Ok(Json(todos))
}

/// POST /api/todos/
pub async fn create_todo(
    State(state): State<AppState>,
    ctx: Ctx,
    Json(input): Json<TodoInput>,
) -> Result<(StatusCode, Json<Todo>)> {
    info!("POST /api/todos/ - user {}", ctx.user_id());

    input.validate().map_err(Error::BadRequest)?;
    check_category(&state, ctx.user_id(), input.category_id).await?;

    let todo = state.store.create_todo(ctx.user_id(), &input).await?;

    Ok((StatusCode::CREATED, Json(todo)))
}

/// GET /api/todos/{id}/
pub async fn get_todo(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<i64>,
) -> Result<Json<Todo>> {
    info!("GET /api/todos/{}/ - user {}", id, ctx.user_id());

    let todo = state
        .store
        .get_todo(ctx.user_id(), id)
        .await?
        .ok_or(Error::TodoNotFound { id })?;

    Ok(Json(todo))
}

/// PUT /api/todos/{id}/
pub async fn replace_todo(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<i64>,
    Json(input): Json<TodoInput>,
) -> Result<Json<Todo>> {
    info!("PUT /api/todos/{}/ - user {}", id, ctx.user_id());

    input.validate().map_err(Error::BadRequest)?;
    check_category(&state, ctx.user_id(), input.category_id).await?;

    let todo = state
        .store
        .replace_todo(ctx.user_id(), id, &input)
        .await?
        .ok_or(Error::TodoNotFound { id })?;

    Ok(Json(todo))
}

/// PATCH /api/todos/{id}/
pub async fn patch_todo(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<i64>,
    Json(patch): Json<TodoPatch>,
) -> Result<Json<Todo>> {
    info!("PATCH /api/todos/{}/ - user {}", id, ctx.user_id());

    patch.validate().map_err(Error::BadRequest)?;
    if let Some(Some(category_id)) = patch.category_id {
        check_category(&state, ctx.user_id(), Some(category_id)).await?;
    }

    let todo = state
        .store
        .patch_todo(ctx.user_id(), id, &patch)
        .await?
        .ok_or(Error::TodoNotFound { id })?;

    Ok(Json(todo))
}

/// DELETE /api/todos/{id}/
pub async fn delete_todo(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    info!("DELETE /api/todos/{}/ - user {}", id, ctx.user_id());

    let deleted = state.store.delete_todo(ctx.user_id(), id).await?;
    if !deleted {
        return Err(Error::TodoNotFound { id });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Reject todo input naming a category the user does not own
async fn check_category(state: &AppState, user_id: i64, category_id: Option<i64>) -> Result<()> {
    if let Some(id) = category_id {
        if !state.store.category_exists(user_id, id).await? {
            return Err(Error::BadRequest(format!(
                "category: Invalid pk \"{id}\" - object does not exist."
            )));
        }
    }
    Ok(())
}
