//! Record store abstraction and its two implementations.
//!
//! # Design
//! Handlers only ever see `SharedStore` (`Arc<dyn TodoStore>`), injected
//! into the router at construction. The memory and SQLite variants are
//! interchangeable behind the trait; `connect` picks one from configuration.

mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{StorageMode, StoreConfig};
use crate::model::{NewTodo, Priority, PriorityStats, TodoItem};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A persisted row that does not decode into a `TodoItem`.
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Store misconfigured: {0}")]
    Configuration(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Mapping from id to `TodoItem`.
///
/// Every method is a single store operation; callers get no atomicity
/// across calls.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Assigns a fresh id, persists, and returns the stored record.
    async fn insert(&self, todo: NewTodo) -> StoreResult<TodoItem>;

    /// Inserts every item or none of them. Each item receives a fresh id.
    async fn insert_many(&self, todos: Vec<NewTodo>) -> StoreResult<Vec<TodoItem>>;

    async fn get(&self, id: &str) -> StoreResult<TodoItem>;

    /// All items in insertion order.
    async fn list(&self) -> StoreResult<Vec<TodoItem>>;

    /// Replaces title, description and priority of the item with `id`.
    async fn update(&self, id: &str, todo: NewTodo) -> StoreResult<TodoItem>;

    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Removes everything and returns how many items were dropped.
    async fn delete_all(&self) -> StoreResult<u64>;

    async fn filter_by_priority(&self, priority: Priority) -> StoreResult<Vec<TodoItem>>;

    async fn count(&self) -> StoreResult<u64>;

    async fn count_by_priority(&self, priority: Priority) -> StoreResult<u64>;

    /// Case-insensitive substring search over title and description.
    async fn search(&self, query: &str) -> StoreResult<Vec<TodoItem>>;

    /// Items whose (title, description, priority) repeats an earlier item,
    /// in encounter order. First occurrences are never included.
    async fn duplicates(&self) -> StoreResult<Vec<TodoItem>>;

    async fn exists_duplicate(&self, candidate: &NewTodo) -> StoreResult<bool>;

    /// Per-priority counts read from a single snapshot of the store.
    async fn stats(&self) -> StoreResult<PriorityStats>;
}

pub type SharedStore = Arc<dyn TodoStore>;

/// Builds the store selected by `config`.
///
/// # Errors
///
/// Returns `StoreError::Configuration` when SQLite is selected without a URL,
/// or `StoreError::Database` when the database cannot be opened.
pub async fn connect(config: &StoreConfig) -> StoreResult<SharedStore> {
    match config.storage_mode {
        StorageMode::Memory => {
            tracing::info!("using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageMode::Sqlite => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                StoreError::Configuration("DATABASE_URL is not set".to_string())
            })?;
            tracing::info!("using sqlite store");
            Ok(Arc::new(SqliteStore::connect(url).await?))
        }
    }
}

/// Returns the items whose content key was already seen earlier in `items`.
fn repeated<I>(items: I) -> Vec<TodoItem>
where
    I: IntoIterator<Item = TodoItem>,
{
    let mut seen = std::collections::HashSet::new();
    let mut repeats = Vec::new();
    for item in items {
        let key = (item.title.clone(), item.description.clone(), item.priority);
        if !seen.insert(key) {
            repeats.push(item);
        }
    }
    repeats
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
