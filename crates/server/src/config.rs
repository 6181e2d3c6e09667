//! Todo server configuration

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::auth::AuthManager;
use crate::store::TodoStore;

/// Configuration for the Todo Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// SQLite database file
    pub db_path: PathBuf,
    /// Address to listen on
    pub bind_addr: SocketAddr,
    /// Secret used to sign access tokens
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in days
    pub refresh_ttl_days: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let bind_addr = std::env::var("TODO_BIND")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8000)));

        let jwt_secret = match std::env::var("TODO_JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("[Config] TODO_JWT_SECRET not set, using a random secret; tokens will not survive restarts");
                uuid::Uuid::new_v4().to_string()
            }
        };

        let access_ttl_secs = std::env::var("TODO_ACCESS_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(900);

        Self {
            db_path: todo_common::db_path(),
            bind_addr,
            jwt_secret,
            access_ttl_secs,
            refresh_ttl_days: 30,
        }
    }
}

impl ServerConfig {
    /// Create config rooted at a custom base directory
    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> Self {
        Self {
            db_path: base_dir.as_ref().join("local").join("todos.sqlite"),
            ..Self::default()
        }
    }

    /// Ensure the database directory exists
    pub async fn ensure_dirs(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthManager>,
    pub store: Arc<TodoStore>,
}
