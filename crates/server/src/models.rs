//! Data models for users, todos, and categories.
//!
//! Wire representations follow the API contract: todos expose their
//! category and owner under the `category` and `user` keys.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MAX_LEN: usize = 128;
pub const TITLE_MAX_LEN: usize = 200;
pub const NAME_MAX_LEN: usize = 100;
pub const COLOR_MAX_LEN: usize = 7;

/// Todo priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// Registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Public user info (no sensitive data)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
        }
    }
}

/// Access/refresh token pair returned by the token endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// A todo item owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: NaiveDate,
    #[serde(rename = "category")]
    pub category_id: Option<i64>,
    #[serde(rename = "user")]
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A user-defined category for grouping todos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub color: String,
    #[serde(rename = "user")]
    pub user_id: i64,
}

/// Input for creating or fully replacing a todo
#[derive(Debug, Clone, Deserialize)]
pub struct TodoInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    pub due_date: NaiveDate,
    #[serde(default, rename = "category")]
    pub category_id: Option<i64>,
}

impl TodoInput {
    pub fn validate(&self) -> core::result::Result<(), String> {
        validate_text("title", &self.title, TITLE_MAX_LEN)
    }
}

/// Partial todo update. Absent fields are left untouched; an explicit
/// `"category": null` clears the category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    #[serde(default, rename = "category", deserialize_with = "double_option")]
    pub category_id: Option<Option<i64>>,
}

impl TodoPatch {
    pub fn validate(&self) -> core::result::Result<(), String> {
        if let Some(title) = &self.title {
            validate_text("title", title, TITLE_MAX_LEN)?;
        }
        Ok(())
    }
}

/// Input for creating or replacing a category
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
}

impl CategoryInput {
    pub fn validate(&self) -> core::result::Result<(), String> {
        validate_text("name", &self.name, NAME_MAX_LEN)?;
        if self.color.len() > COLOR_MAX_LEN {
            return Err(format!(
                "color: Ensure this field has no more than {COLOR_MAX_LEN} characters."
            ));
        }
        Ok(())
    }
}

/// Partial category update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl CategoryPatch {
    pub fn validate(&self) -> core::result::Result<(), String> {
        if let Some(name) = &self.name {
            validate_text("name", name, NAME_MAX_LEN)?;
        }
        if let Some(color) = &self.color {
            if color.len() > COLOR_MAX_LEN {
                return Err(format!(
                    "color: Ensure this field has no more than {COLOR_MAX_LEN} characters."
                ));
            }
        }
        Ok(())
    }
}

fn default_color() -> String {
    "#3B82F6".to_string()
}

pub fn validate_text(field: &str, value: &str, max_len: usize) -> core::result::Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field}: This field may not be blank."));
    }
    if value.chars().count() > max_len {
        return Err(format!(
            "{field}: Ensure this field has no more than {max_len} characters."
        ));
    }
    Ok(())
}

// Distinguishes an absent key (outer None) from an explicit null (Some(None)).
fn double_option<'de, T, D>(de: D) -> core::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}
