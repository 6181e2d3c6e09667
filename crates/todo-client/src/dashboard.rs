//! Dashboard state: a local mirror of the user's todos and categories.
//!
//! Every mutation goes through the server first and the local copy is then
//! reconciled from the server's response, so the dashboard only ever shows
//! what the server acknowledged. Bulk operations fan out one request per
//! item and report per-item outcomes instead of rolling back.

use futures::future::join_all;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::types::{Category, CategoryPayload, Todo, TodoPayload};

/// Outcome of a best-effort bulk operation
#[derive(Debug, Default)]
pub struct BulkOutcome {
    /// Ids the server acknowledged
    pub done: Vec<i64>,
    /// Ids that failed, with the error for each
    pub failed: Vec<(i64, ApiError)>,
}

impl BulkOutcome {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Local mirror of the server-side todo list and categories
#[derive(Debug, Default)]
pub struct Dashboard {
    pub todos: Vec<Todo>,
    pub categories: Vec<Category>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch both collections from the server
    pub async fn load(client: &ApiClient) -> Result<Self> {
        let todos = client.list_todos().await?;
        let categories = client.list_categories().await?;

        Ok(Dashboard { todos, categories })
    }

    // ---- todos ----

    pub async fn create_todo(
        &mut self,
        client: &ApiClient,
        payload: &TodoPayload,
    ) -> Result<&Todo> {
        let todo = client.create_todo(payload).await?;
        // The server lists in insertion order; mirror that locally
        let index = self.todos.len();
        self.todos.push(todo);

        Ok(&self.todos[index])
    }

    pub async fn update_todo(
        &mut self,
        client: &ApiClient,
        id: i64,
        payload: &TodoPayload,
    ) -> Result<&Todo> {
        let todo = client.update_todo(id, payload).await?;
        let index = self.upsert_todo(todo);

        Ok(&self.todos[index])
    }

    /// Flip a todo's completion flag via a full replace
    pub async fn toggle_todo(&mut self, client: &ApiClient, id: i64) -> Result<&Todo> {
        let current = self
            .todos
            .iter()
            .find(|todo| todo.id == id)
            .ok_or(ApiError::NotFound)?;

        let mut payload = TodoPayload::from(current);
        payload.completed = !payload.completed;

        self.update_todo(client, id, &payload).await
    }

    pub async fn delete_todo(&mut self, client: &ApiClient, id: i64) -> Result<()> {
        client.delete_todo(id).await?;
        self.todos.retain(|todo| todo.id != id);

        Ok(())
    }

    // ---- categories ----

    pub async fn create_category(
        &mut self,
        client: &ApiClient,
        payload: &CategoryPayload,
    ) -> Result<&Category> {
        let category = client.create_category(payload).await?;
        let index = self.categories.len();
        self.categories.push(category);

        Ok(&self.categories[index])
    }

    pub async fn update_category(
        &mut self,
        client: &ApiClient,
        id: i64,
        payload: &CategoryPayload,
    ) -> Result<&Category> {
        let category = client.update_category(id, payload).await?;

        let index = match self.categories.iter().position(|c| c.id == id) {
            Some(index) => {
                self.categories[index] = category;
                index
            }
            None => {
                self.categories.push(category);
                self.categories.len() - 1
            }
        };

        Ok(&self.categories[index])
    }

    /// Delete a category. Server-side its todos fall back to
    /// uncategorized; the local copies are updated to match.
    pub async fn delete_category(&mut self, client: &ApiClient, id: i64) -> Result<()> {
        client.delete_category(id).await?;

        self.categories.retain(|category| category.id != id);
        for todo in &mut self.todos {
            if todo.category_id == Some(id) {
                todo.category_id = None;
            }
        }

        Ok(())
    }

    // ---- bulk operations ----

    /// Mark several todos completed, one parallel request per id
    pub async fn complete_todos(&mut self, client: &ApiClient, ids: &[i64]) -> BulkOutcome {
        let mut requests = Vec::with_capacity(ids.len());
        for &id in ids {
            let payload = self.todos.iter().find(|todo| todo.id == id).map(|todo| {
                let mut payload = TodoPayload::from(todo);
                payload.completed = true;
                payload
            });
            requests.push(async move {
                match payload {
                    Some(payload) => (id, client.update_todo(id, &payload).await),
                    None => (id, Err(ApiError::NotFound)),
                }
            });
        }

        let mut outcome = BulkOutcome::default();
        for (id, result) in join_all(requests).await {
            match result {
                Ok(todo) => {
                    self.upsert_todo(todo);
                    outcome.done.push(id);
                }
                Err(e) => {
                    debug!("Bulk complete failed for todo {}: {}", id, e);
                    outcome.failed.push((id, e));
                }
            }
        }

        outcome
    }

    /// Move several todos to a category (or to none), one parallel request per id
    pub async fn move_todos(
        &mut self,
        client: &ApiClient,
        ids: &[i64],
        category_id: Option<i64>,
    ) -> BulkOutcome {
        let mut requests = Vec::with_capacity(ids.len());
        for &id in ids {
            let payload = self.todos.iter().find(|todo| todo.id == id).map(|todo| {
                let mut payload = TodoPayload::from(todo);
                payload.category_id = category_id;
                payload
            });
            requests.push(async move {
                match payload {
                    Some(payload) => (id, client.update_todo(id, &payload).await),
                    None => (id, Err(ApiError::NotFound)),
                }
            });
        }

        let mut outcome = BulkOutcome::default();
        for (id, result) in join_all(requests).await {
            match result {
                Ok(todo) => {
                    self.upsert_todo(todo);
                    outcome.done.push(id);
                }
                Err(e) => {
                    debug!("Bulk move failed for todo {}: {}", id, e);
                    outcome.failed.push((id, e));
                }
            }
        }

        outcome
    }

    /// Delete several todos, one parallel request per id
    pub async fn delete_todos(&mut self, client: &ApiClient, ids: &[i64]) -> BulkOutcome {
        let requests = ids
            .iter()
            .map(|&id| async move { (id, client.delete_todo(id).await) });

        let mut outcome = BulkOutcome::default();
        for (id, result) in join_all(requests).await {
            match result {
                Ok(()) => {
                    self.todos.retain(|todo| todo.id != id);
                    outcome.done.push(id);
                }
                Err(e) => {
                    debug!("Bulk delete failed for todo {}: {}", id, e);
                    outcome.failed.push((id, e));
                }
            }
        }

        outcome
    }

    /// Replace a todo in place, or append it, returning its index
    fn upsert_todo(&mut self, todo: Todo) -> usize {
        match self.todos.iter().position(|t| t.id == todo.id) {
            Some(index) => {
                self.todos[index] = todo;
                index
            }
            None => {
                self.todos.push(todo);
                self.todos.len() - 1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;
    use chrono::{NaiveDate, Utc};

    fn todo(id: i64, title: &str) -> Todo {
        Todo {
            id,
            title: title.to_string(),
            description: String::new(),
            completed: false,
            priority: Priority::Medium,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            category_id: None,
            user_id: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut dashboard = Dashboard {
            todos: vec![todo(1, "a"), todo(2, "b")],
            categories: Vec::new(),
        };

        let index = dashboard.upsert_todo(todo(2, "b updated"));
        assert_eq!(index, 1);
        assert_eq!(dashboard.todos.len(), 2);
        assert_eq!(dashboard.todos[1].title, "b updated");
    }

    #[test]
    fn upsert_appends_unknown() {
        let mut dashboard = Dashboard {
            todos: vec![todo(1, "a")],
            categories: Vec::new(),
        };

        let index = dashboard.upsert_todo(todo(9, "new"));
        assert_eq!(index, 1);
        assert_eq!(dashboard.todos[1].id, 9);
        assert_eq!(dashboard.todos.len(), 2);
    }

    #[test]
    fn bulk_outcome_all_ok() {
        let mut outcome = BulkOutcome::default();
        outcome.done.push(1);
        assert!(outcome.all_ok());

        outcome.failed.push((2, ApiError::NotFound));
        assert!(!outcome.all_ok());
    }
}
