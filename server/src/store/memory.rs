use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{new_id, repeated, StoreError, StoreResult, TodoStore};
use crate::model::{NewTodo, Priority, PriorityStats, TodoItem};

/// Process-lifetime store. A `Vec` keeps insertion order; the lock makes
/// each individual operation atomic.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    items: Arc<RwLock<Vec<TodoItem>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert(&self, todo: NewTodo) -> StoreResult<TodoItem> {
        let item = todo.into_item(new_id());
        self.items.write().await.push(item.clone());
        Ok(item)
    }

    async fn insert_many(&self, todos: Vec<NewTodo>) -> StoreResult<Vec<TodoItem>> {
        let created: Vec<TodoItem> = todos
            .into_iter()
            .map(|todo| todo.into_item(new_id()))
            .collect();
        self.items.write().await.extend(created.iter().cloned());
        Ok(created)
    }

    async fn get(&self, id: &str) -> StoreResult<TodoItem> {
        self.items
            .read()
            .await
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list(&self) -> StoreResult<Vec<TodoItem>> {
        Ok(self.items.read().await.clone())
    }

    async fn update(&self, id: &str, todo: NewTodo) -> StoreResult<TodoItem> {
        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        item.title = todo.title;
        item.description = todo.description;
        item.priority = todo.priority;
        Ok(item.clone())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut items = self.items.write().await;
        let index = items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        items.remove(index);
        Ok(())
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut items = self.items.write().await;
        let removed = items.len() as u64;
        items.clear();
        Ok(removed)
    }

    async fn filter_by_priority(&self, priority: Priority) -> StoreResult<Vec<TodoItem>> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .filter(|item| item.priority == priority)
            .cloned()
            .collect())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.items.read().await.len() as u64)
    }

    async fn count_by_priority(&self, priority: Priority) -> StoreResult<u64> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .filter(|item| item.priority == priority)
            .count() as u64)
    }

    async fn stats(&self) -> StoreResult<PriorityStats> {
        let items = self.items.read().await;
        let mut stats = PriorityStats::default();
        for item in items.iter() {
            stats.record(item.priority, 1);
        }
        Ok(stats)
    }

    async fn search(&self, query: &str) -> StoreResult<Vec<TodoItem>> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .filter(|item| item.matches(query))
            .cloned()
            .collect())
    }

    async fn duplicates(&self) -> StoreResult<Vec<TodoItem>> {
        Ok(repeated(self.items.read().await.iter().cloned()))
    }

    async fn exists_duplicate(&self, candidate: &NewTodo) -> StoreResult<bool> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .any(|item| item.same_content(candidate)))
    }
}
