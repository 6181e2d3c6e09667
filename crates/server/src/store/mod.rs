//! Todo storage module
//!
//! SQLite-backed storage for todos and categories. Every query is scoped
//! to the owning user, so a row belonging to another user is
//! indistinguishable from a missing one.

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::models::{Category, CategoryInput, CategoryPatch, Priority, Todo, TodoInput, TodoPatch};

const TODO_COLUMNS: &str =
    "id, title, description, completed, priority, due_date, category_id, user_id, created_at";

type TodoRow = (
    i64,
    String,
    String,
    bool,
    String,
    String,
    Option<i64>,
    i64,
    String,
);

type CategoryRow = (i64, String, String, i64);

fn todo_from_row(row: TodoRow) -> Todo {
    let (id, title, description, completed, priority, due_date, category_id, user_id, created_at) =
        row;
    Todo {
        id,
        title,
        description,
        completed,
        priority: Priority::parse(&priority).unwrap_or_default(),
        due_date: due_date
            .parse()
            .unwrap_or_else(|_| Utc::now().date_naive()),
        category_id,
        user_id,
        created_at: created_at.parse().unwrap_or_else(|_| Utc::now()),
    }
}

fn category_from_row(row: CategoryRow) -> Category {
    let (id, name, color, user_id) = row;
    Category {
        id,
        name,
        color,
        user_id,
    }
}

/// SQLite store for todos and categories
pub struct TodoStore {
    pool: SqlitePool,
}

impl TodoStore {
    /// Create new store and initialize its tables
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.init_db().await?;

        info!("[Store] Initialized");

        Ok(store)
    }

    async fn init_db(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                color TEXT NOT NULL DEFAULT '#3B82F6',
                user_id INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                completed INTEGER NOT NULL DEFAULT 0,
                priority TEXT NOT NULL DEFAULT 'medium',
                due_date TEXT NOT NULL,
                category_id INTEGER,
                user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE SET NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ---- Categories ----

    pub async fn list_categories(&self, user_id: i64) -> Result<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            "SELECT id, name, color, user_id FROM categories WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(category_from_row).collect())
    }

    pub async fn get_category(&self, user_id: i64, id: i64) -> Result<Option<Category>> {
        let row: Option<CategoryRow> = sqlx::query_as(
            "SELECT id, name, color, user_id FROM categories WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(category_from_row))
    }

    pub async fn create_category(&self, user_id: i64, input: &CategoryInput) -> Result<Category> {
        let result = sqlx::query("INSERT INTO categories (name, color, user_id) VALUES (?, ?, ?)")
            .bind(&input.name)
            .bind(&input.color)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            color: input.color.clone(),
            user_id,
        })
    }

    pub async fn update_category(
        &self,
        user_id: i64,
        id: i64,
        input: &CategoryInput,
    ) -> Result<Option<Category>> {
        let result = sqlx::query(
            "UPDATE categories SET name = ?, color = ? WHERE id = ? AND user_id = ?",
        )
        .bind(&input.name)
        .bind(&input.color)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(Category {
            id,
            name: input.name.clone(),
            color: input.color.clone(),
            user_id,
        }))
    }

    /// Apply a partial category update
    pub async fn patch_category(
        &self,
        user_id: i64,
        id: i64,
        patch: &CategoryPatch,
    ) -> Result<Option<Category>> {
        let current = match self.get_category(user_id, id).await? {
            Some(category) => category,
            None => return Ok(None),
        };

        let input = CategoryInput {
            name: patch.name.clone().unwrap_or(current.name),
            color: patch.color.clone().unwrap_or(current.color),
        };

        self.update_category(user_id, id, &input).await
    }

    /// Delete a category. Todos referencing it fall back to uncategorized
    /// via the `ON DELETE SET NULL` constraint.
    pub async fn delete_category(&self, user_id: i64, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check that a category exists and belongs to the user
    pub async fn category_exists(&self, user_id: i64, id: i64) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM categories WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.is_some())
    }

    // ---- Todos ----

    pub async fn list_todos(&self, user_id: i64) -> Result<Vec<Todo>> {
        let rows: Vec<TodoRow> = sqlx::query_as(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ? ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(todo_from_row).collect())
    }

    pub async fn get_todo(&self, user_id: i64, id: i64) -> Result<Option<Todo>> {
        let row: Option<TodoRow> = sqlx::query_as(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(todo_from_row))
    }

    pub async fn create_todo(&self, user_id: i64, input: &TodoInput) -> Result<Todo> {
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO todos (title, description, completed, priority, due_date, category_id, user_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.completed)
        .bind(input.priority.as_str())
        .bind(input.due_date.to_string())
        .bind(input.category_id)
        .bind(user_id)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Todo {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            description: input.description.clone(),
            completed: input.completed,
            priority: input.priority,
            due_date: input.due_date,
            category_id: input.category_id,
            user_id,
            created_at,
        })
    }

    /// Replace every mutable field of a todo
    pub async fn replace_todo(
        &self,
        user_id: i64,
        id: i64,
        input: &TodoInput,
    ) -> Result<Option<Todo>> {
        let result = sqlx::query(
            r#"
            UPDATE todos
            SET title = ?, description = ?, completed = ?, priority = ?, due_date = ?, category_id = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.completed)
        .bind(input.priority.as_str())
        .bind(input.due_date.to_string())
        .bind(input.category_id)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_todo(user_id, id).await
    }

    /// Apply a partial update. Only the fields present in the patch change.
    pub async fn patch_todo(
        &self,
        user_id: i64,
        id: i64,
        patch: &TodoPatch,
    ) -> Result<Option<Todo>> {
        let current = match self.get_todo(user_id, id).await? {
            Some(todo) => todo,
            None => return Ok(None),
        };

        let input = TodoInput {
            title: patch.title.clone().unwrap_or(current.title),
            description: patch.description.clone().unwrap_or(current.description),
            completed: patch.completed.unwrap_or(current.completed),
            priority: patch.priority.unwrap_or(current.priority),
            due_date: patch.due_date.unwrap_or(current.due_date),
            category_id: patch.category_id.unwrap_or(current.category_id),
        };

        self.replace_todo(user_id, id, &input).await
    }

    pub async fn delete_todo(&self, user_id: i64, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
