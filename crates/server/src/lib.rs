//! Todo Server Library
//!
//! REST API for a multi-user todo application: JWT access tokens with
//! rotating refresh tokens, and per-user todos and categories in SQLite.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod error;
pub mod handlers;
pub mod models;
pub mod store;

use axum::{middleware, routing::get, routing::post, Router};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use auth::middleware::mw_require_auth;
use auth::AuthManager;
use config::{AppState, ServerConfig};
use handlers::{
    // Categories
    create_category,
    // Todos
    create_todo,
    delete_category,
    delete_todo,
    get_category,
    get_todo,
    list_categories,
    list_todos,
    // Auth
    logout,
    me,
    obtain_token,
    patch_category,
    patch_todo,
    refresh_token,
    register,
    replace_category,
    replace_todo,
};
use store::TodoStore;

/// Initialize the database pool and managers for the given config
pub async fn init_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    config.ensure_dirs().await?;

    let options = SqliteConnectOptions::new()
        .filename(&config.db_path)
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    let auth = Arc::new(
        AuthManager::new(
            pool.clone(),
            config.jwt_secret.clone(),
            config.access_ttl_secs,
            config.refresh_ttl_days,
        )
        .await?,
    );

    let store = Arc::new(TodoStore::new(pool).await?);

    Ok(AppState { auth, store })
}

/// Build the API router
pub fn app(state: AppState) -> Router {
    // Everything under the auth middleware requires a valid access token
    let protected = Router::new()
        .route("/api/todos/", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}/",
            get(get_todo)
                .put(replace_todo)
                .patch(patch_todo)
                .delete(delete_todo),
        )
        .route("/api/categories/", get(list_categories).post(create_category))
        .route(
            "/api/categories/{id}/",
            get(get_category)
                .put(replace_category)
                .patch(patch_category)
                .delete(delete_category),
        )
        .route("/api/me/", get(me))
        .route_layer(middleware::from_fn_with_state(state.clone(), mw_require_auth));

    let public = Router::new()
        .route("/api/register/", post(register))
        .route("/api/token/", post(obtain_token))
        .route("/api/token/refresh/", post(refresh_token))
        .route("/api/logout/", post(logout))
        .route("/health", get(health_check));

    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Serve the app on an already-bound listener
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
    axum::serve(listener, app(state)).await?;
    Ok(())
}

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    info!("=== Todo Server ===");

    let config = ServerConfig::default();
    info!("Database: {:?}", config.db_path);

    let state = init_state(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    serve(listener, state).await
}

async fn health_check() -> &'static str {
    "OK - Todo Server"
}
