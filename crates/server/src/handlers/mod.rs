//! Handlers for the todo API

pub mod auth;
pub mod categories;
pub mod todos;

// Re-export AppState from config
pub use crate::config::AppState;

// Auth handlers
pub use auth::{logout, me, obtain_token, refresh_token, register};

// Category handlers
pub use categories::{
    create_category, delete_category, get_category, list_categories, patch_category,
    replace_category,
};

// Todo handlers
pub use todos::{create_todo, delete_todo, get_todo, list_todos, patch_todo, replace_todo};
