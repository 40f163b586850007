//! SQLite-backed `TodoStore`.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS todos (
//!     id          TEXT PRIMARY KEY NOT NULL,
//!     title       TEXT NOT NULL,
//!     description TEXT,
//!     priority    TEXT NOT NULL
//! );
//! ```
//!
//! Rows are listed in `rowid` order, which is insertion order, so duplicate
//! detection reports encounter order the same way the memory store does.
//! `search` and `duplicates` scan the table and reuse the predicates on
//! `TodoItem` to keep case-folding identical across stores.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;

use super::{new_id, repeated, StoreError, StoreResult, TodoStore};
use crate::model::{NewTodo, Priority, PriorityStats, TodoItem};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS todos (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    priority TEXT NOT NULL
)";

const SELECT_COLUMNS: &str = "SELECT id, title, description, priority FROM todos";

#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id: String,
    title: String,
    description: Option<String>,
    priority: String,
}

impl TryFrom<TodoRow> for TodoItem {
    type Error = StoreError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let priority = Priority::from_str(&row.priority).map_err(|e| {
            StoreError::CorruptRecord(format!("todo {}: {e}", row.id))
        })?;
        Ok(TodoItem {
            id: row.id,
            title: row.title,
            description: row.description,
            priority,
        })
    }
}

fn into_items(rows: Vec<TodoRow>) -> StoreResult<Vec<TodoItem>> {
    rows.into_iter().map(TodoItem::try_from).collect()
}

fn insert_query(item: &TodoItem) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    sqlx::query("INSERT INTO todos (id, title, description, priority) VALUES (?, ?, ?, ?)")
        .bind(item.id.as_str())
        .bind(item.title.as_str())
        .bind(item.description.as_deref())
        .bind(item.priority.as_str())
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (or creates) the database at `url` and ensures the `todos`
    /// table exists.
    ///
    /// In-memory URLs get a single connection that is never recycled; each
    /// SQLite memory connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the URL is invalid or the database
    /// cannot be opened.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new();
        if url.contains(":memory:") || url.contains("mode=memory") {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;
        Self::with_pool(pool).await
    }

    /// Wraps an existing pool, creating the table if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the table cannot be created.
    pub async fn with_pool(pool: SqlitePool) -> StoreResult<Self> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_all_items(&self) -> StoreResult<Vec<TodoItem>> {
        let rows = sqlx::query_as::<_, TodoRow>(&format!("{SELECT_COLUMNS} ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?;
        into_items(rows)
    }
}

#[async_trait]
impl TodoStore for SqliteStore {
    async fn insert(&self, todo: NewTodo) -> StoreResult<TodoItem> {
        let item = todo.into_item(new_id());
        insert_query(&item).execute(&self.pool).await?;
        tracing::debug!(id = %item.id, "inserted todo row");
        Ok(item)
    }

    async fn insert_many(&self, todos: Vec<NewTodo>) -> StoreResult<Vec<TodoItem>> {
        let created: Vec<TodoItem> = todos
            .into_iter()
            .map(|todo| todo.into_item(new_id()))
            .collect();

        let mut tx = self.pool.begin().await?;
        for item in &created {
            insert_query(item).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::debug!(count = created.len(), "inserted todo batch");
        Ok(created)
    }

    async fn get(&self, id: &str) -> StoreResult<TodoItem> {
        let row = sqlx::query_as::<_, TodoRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        TodoItem::try_from(row)
    }

    async fn list(&self) -> StoreResult<Vec<TodoItem>> {
        self.fetch_all_items().await
    }

    async fn update(&self, id: &str, todo: NewTodo) -> StoreResult<TodoItem> {
        let result =
            sqlx::query("UPDATE todos SET title = ?, description = ?, priority = ? WHERE id = ?")
                .bind(todo.title.as_str())
                .bind(todo.description.as_deref())
                .bind(todo.priority.as_str())
                .bind(id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(todo.into_item(id.to_string()))
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM todos").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn filter_by_priority(&self, priority: Priority) -> StoreResult<Vec<TodoItem>> {
        let rows = sqlx::query_as::<_, TodoRow>(&format!(
            "{SELECT_COLUMNS} WHERE priority = ? ORDER BY rowid"
        ))
        .bind(priority.as_str())
        .fetch_all(&self.pool)
        .await?;
        into_items(rows)
    }

    async fn count(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.unsigned_abs())
    }

    async fn count_by_priority(&self, priority: Priority) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE priority = ?")
            .bind(priority.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count.unsigned_abs())
    }

    async fn stats(&self) -> StoreResult<PriorityStats> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT priority, COUNT(*) FROM todos GROUP BY priority")
                .fetch_all(&self.pool)
                .await?;
        let mut stats = PriorityStats::default();
        for (priority, count) in rows {
            let priority = Priority::from_str(&priority)
                .map_err(|e| StoreError::CorruptRecord(format!("stats: {e}")))?;
            stats.record(priority, count.unsigned_abs());
        }
        Ok(stats)
    }

    async fn search(&self, query: &str) -> StoreResult<Vec<TodoItem>> {
        let items = self.fetch_all_items().await?;
        Ok(items.into_iter().filter(|item| item.matches(query)).collect())
    }

    async fn duplicates(&self) -> StoreResult<Vec<TodoItem>> {
        Ok(repeated(self.fetch_all_items().await?))
    }

    async fn exists_duplicate(&self, candidate: &NewTodo) -> StoreResult<bool> {
        // `IS` compares NULL descriptions as equal.
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM todos WHERE title = ? AND description IS ? AND priority = ?)",
        )
        .bind(candidate.title.as_str())
        .bind(candidate.description.as_deref())
        .bind(candidate.priority.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists != 0)
    }
}
