//! Centralized directory structure management for TodoApp
//!
//! Directory layout:
//! ```text
//! todo_data/
//! ├── local/           # Server SQLite database
//! └── session/         # Client session file (token pair)
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Serialize, Deserialize, Debug)]
struct TodoConfig {
    todo_root: Option<PathBuf>,
}

/// Get the global configuration path
fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("todoapp").join("config.json"))
}

/// Load the persistent root from config file
pub fn load_persistent_root() -> Option<PathBuf> {
    let path = get_config_path()?;
    if !path.exists() {
        return None;
    }

    match fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str::<TodoConfig>(&content) {
            Ok(config) => config.todo_root,
            Err(e) => {
                warn!("Failed to parse config file at {:?}: {}", path, e);
                None
            }
        },
        Err(e) => {
            warn!("Failed to read config file at {:?}: {}", path, e);
            None
        }
    }
}

/// Save a path as the persistent TodoApp root
pub fn save_persistent_root(root: PathBuf) -> anyhow::Result<()> {
    let path = get_config_path().ok_or_else(|| anyhow::anyhow!("Could not determine config dir"))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config = TodoConfig {
        todo_root: Some(root),
    };
    let json = serde_json::to_string_pretty(&config)?;
    fs::write(path, json)?;
    Ok(())
}

/// Get the TODO_ROOT directory from environment, persistent config, or default
pub fn todo_root() -> PathBuf {
    // 1. Check environment variable
    if let Ok(val) = std::env::var("TODO_ROOT") {
        return PathBuf::from(val);
    }

    // 2. Check persistent config
    if let Some(root) = load_persistent_root() {
        // Set env var so subprocesses see it too
        std::env::set_var("TODO_ROOT", &root);
        return root;
    }

    // 3. Default fallback
    PathBuf::from("todo_data")
}

/// Set the TODO_ROOT directory at runtime
pub fn set_todo_root(path: PathBuf) {
    info!("Setting TODO_ROOT to: {:?}", path);
    std::env::set_var("TODO_ROOT", path);
}

/// Local data directory (server SQLite database)
pub fn local_dir() -> PathBuf {
    todo_root().join("local")
}

/// Client session directory (stored token pair)
pub fn session_dir() -> PathBuf {
    todo_root().join("session")
}

/// Server database file path
pub fn db_path() -> PathBuf {
    local_dir().join("todos.sqlite")
}

/// Client session file path
pub fn session_path() -> PathBuf {
    session_dir().join("session.json")
}

/// Ensure a single directory exists
pub fn ensure_dir(path: &PathBuf) -> anyhow::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
        info!("Created directory: {:?}", path);
    }
    Ok(())
}

/// Initialize the complete directory structure
/// Call this once at app startup before any other operations
pub fn init_structure() -> anyhow::Result<PathBuf> {
    let root = todo_root();

    // Ensure root exists first
    ensure_dir(&root)?;

    // Create all subdirectories
    ensure_dir(&local_dir())?;
    ensure_dir(&session_dir())?;

    // Canonicalize for absolute path
    let canonical = std::fs::canonicalize(&root).unwrap_or_else(|_| root.clone());

    info!("TodoApp directory structure initialized at: {:?}", canonical);

    Ok(canonical)
}

/// Ensure a file's parent directory exists
pub fn ensure_parent(path: &PathBuf) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(&parent.to_path_buf())?;
    }
    Ok(())
}
