//! Route handlers.
//!
//! Each handler validates any priority it receives before touching the
//! store, performs a single store call, and serializes the result.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ApiError, JsonBody};
use crate::model::{NewTodo, Priority, PriorityStats, TodoItem, TodoPayload};
use crate::store::SharedStore;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct Detail {
    pub detail: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DeleteAllSummary {
    pub detail: &'static str,
    pub deleted: u64,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

fn parse_level(level: &str) -> ApiResult<Priority> {
    Ok(level.parse()?)
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Todo List API" }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

pub async fn create_todo(
    State(store): State<SharedStore>,
    JsonBody(payload): JsonBody<TodoPayload>,
) -> ApiResult<(StatusCode, Json<TodoItem>)> {
    let todo = payload.validate()?;
    let item = store.insert(todo).await?;
    tracing::info!(id = %item.id, priority = %item.priority, "created todo");
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list_todos(State(store): State<SharedStore>) -> ApiResult<Json<Vec<TodoItem>>> {
    Ok(Json(store.list().await?))
}

pub async fn get_todo(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> ApiResult<Json<TodoItem>> {
    Ok(Json(store.get(&id).await?))
}

pub async fn update_todo(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<TodoPayload>,
) -> ApiResult<Json<TodoItem>> {
    let todo = payload.validate()?;
    let item = store.update(&id, todo).await?;
    tracing::info!(id = %item.id, "updated todo");
    Ok(Json(item))
}

pub async fn delete_todo(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> ApiResult<Json<Detail>> {
    store.delete(&id).await?;
    tracing::info!(%id, "deleted todo");
    Ok(Json(Detail {
        detail: "Item deleted",
    }))
}

pub async fn delete_all_todos(
    State(store): State<SharedStore>,
) -> ApiResult<Json<DeleteAllSummary>> {
    let deleted = store.delete_all().await?;
    tracing::info!(deleted, "deleted all todos");
    Ok(Json(DeleteAllSummary {
        detail: "All items deleted",
        deleted,
    }))
}

pub async fn todos_by_priority(
    State(store): State<SharedStore>,
    Path(level): Path<String>,
) -> ApiResult<Json<Vec<TodoItem>>> {
    let priority = parse_level(&level)?;
    Ok(Json(store.filter_by_priority(priority).await?))
}

pub async fn count_todos(State(store): State<SharedStore>) -> ApiResult<Json<u64>> {
    Ok(Json(store.count().await?))
}

pub async fn count_todos_by_priority(
    State(store): State<SharedStore>,
    Path(level): Path<String>,
) -> ApiResult<Json<u64>> {
    let priority = parse_level(&level)?;
    Ok(Json(store.count_by_priority(priority).await?))
}

pub async fn search_todos(
    State(store): State<SharedStore>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<TodoItem>>> {
    Ok(Json(store.search(&params.query).await?))
}

pub async fn todo_stats(State(store): State<SharedStore>) -> ApiResult<Json<PriorityStats>> {
    Ok(Json(store.stats().await?))
}

pub async fn duplicate_todos(State(store): State<SharedStore>) -> ApiResult<Json<Vec<TodoItem>>> {
    Ok(Json(store.duplicates().await?))
}

pub async fn check_duplicate(
    State(store): State<SharedStore>,
    JsonBody(payload): JsonBody<TodoPayload>,
) -> ApiResult<Json<bool>> {
    let candidate = payload.validate()?;
    Ok(Json(store.exists_duplicate(&candidate).await?))
}

pub async fn export_todos(State(store): State<SharedStore>) -> ApiResult<Json<Vec<TodoItem>>> {
    Ok(Json(store.list().await?))
}

/// Validates the whole batch first, so a bad item anywhere means nothing is
/// stored.
pub async fn import_todos(
    State(store): State<SharedStore>,
    JsonBody(payloads): JsonBody<Vec<TodoPayload>>,
) -> ApiResult<(StatusCode, Json<Vec<TodoItem>>)> {
    let todos = payloads
        .into_iter()
        .map(|payload| {
            let title = payload.title.clone();
            payload
                .validate()
                .map_err(|_| ApiError::InvalidImportItem { title })
        })
        .collect::<ApiResult<Vec<NewTodo>>>()?;

    let created = store.insert_many(todos).await?;
    tracing::info!(count = created.len(), "imported todos");
    Ok((StatusCode::CREATED, Json(created)))
}
