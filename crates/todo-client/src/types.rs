//! Application-level types for todos and categories.
//!
//! The server names a todo's category and owner `category` and `user` on
//! the wire; locally they are `category_id` and `user_id`. Serde renames
//! bridge the two so the rest of the crate never sees wire names.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

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

/// A todo item as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

impl Todo {
    /// A todo is overdue when its due date has passed and it is still open.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date < today
    }
}

/// A user-defined category for grouping todos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub color: String,
    #[serde(rename = "user")]
    pub user_id: i64,
}

/// Request body for creating or fully replacing a todo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoPayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    pub due_date: NaiveDate,
    #[serde(rename = "category")]
    pub category_id: Option<i64>,
}

impl From<&Todo> for TodoPayload {
    fn from(todo: &Todo) -> Self {
        TodoPayload {
            title: todo.title.clone(),
            description: todo.description.clone(),
            completed: todo.completed,
            priority: todo.priority,
            due_date: todo.due_date,
            category_id: todo.category_id,
        }
    }
}

/// Request body for creating or replacing a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    pub color: String,
}

/// Public account info
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn todo_parses_wire_names() {
        let json = r#"{
            "id": 3,
            "title": "Buy milk",
            "description": "",
            "completed": false,
            "priority": "high",
            "due_date": "2024-01-15",
            "category": 7,
            "user": 1,
            "created_at": "2024-01-10T12:00:00Z"
        }"#;

        let todo: Todo = serde_json::from_str(json).unwrap();
        assert_eq!(todo.category_id, Some(7));
        assert_eq!(todo.user_id, 1);
        assert_eq!(todo.priority, Priority::High);
        assert_eq!(todo.due_date, day(2024, 1, 15));
    }

    #[test]
    fn payload_serializes_wire_names() {
        let payload = TodoPayload {
            title: "Buy milk".to_string(),
            description: String::new(),
            completed: false,
            priority: Priority::Low,
            due_date: day(2024, 1, 15),
            category_id: None,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["category"], serde_json::Value::Null);
        assert_eq!(value["priority"], "low");
        assert!(value.get("category_id").is_none());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn payload_from_todo_preserves_fields() {
        let todo = Todo {
            id: 3,
            title: "Buy milk".to_string(),
            description: "2 liters".to_string(),
            completed: true,
            priority: Priority::High,
            due_date: day(2024, 1, 15),
            category_id: Some(7),
            user_id: 1,
            created_at: Utc::now(),
        };

        let payload = TodoPayload::from(&todo);
        assert_eq!(payload.title, "Buy milk");
        assert!(payload.completed);
        assert_eq!(payload.category_id, Some(7));
    }

    #[test]
    fn overdue_ignores_completed_todos() {
        let today = day(2024, 1, 15);
        let mut todo = Todo {
            id: 1,
            title: "x".to_string(),
            description: String::new(),
            completed: false,
            priority: Priority::Medium,
            due_date: day(2024, 1, 14),
            category_id: None,
            user_id: 1,
            created_at: Utc::now(),
        };

        assert!(todo.is_overdue(today));
        todo.completed = true;
        assert!(!todo.is_overdue(today));
        todo.completed = false;
        todo.due_date = today;
        assert!(!todo.is_overdue(today));
    }
}
