//! REST service for short prioritised todo items.
//!
//! # Overview
//! `app` builds an Axum router over an injected `SharedStore`; `run` serves
//! it on a listener. The store is either process memory or a SQLite table
//! (see `store`), chosen by `config`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod store;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{ServerConfig, StorageMode, StoreConfig};
pub use error::ApiError;
pub use model::{NewTodo, Priority, PriorityStats, TodoItem, TodoPayload};
pub use store::{MemoryStore, SharedStore, SqliteStore, StoreError, TodoStore};

use handlers::*;

pub fn app(store: SharedStore) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health/", get(health))
        .route(
            "/todos/",
            get(list_todos).post(create_todo).delete(delete_all_todos),
        )
        .route("/todos/count/", get(count_todos))
        .route("/todos/count/priority/{level}", get(count_todos_by_priority))
        .route("/todos/priority/{level}", get(todos_by_priority))
        .route("/todos/search/", get(search_todos))
        .route("/todos/stats/", get(todo_stats))
        .route("/todos/duplicates/", get(duplicate_todos))
        .route("/todos/duplicate_check/", post(check_duplicate))
        .route("/todos/export/", get(export_todos))
        .route("/todos/import/", post(import_todos))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(store)
}

/// Serves `app(store)` until the listener fails.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn run(listener: TcpListener, store: SharedStore) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store)).await
}

/// Like [`run`], but stops accepting connections once `shutdown` resolves.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn run_until<F>(
    listener: TcpListener,
    store: SharedStore,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(store))
        .with_graceful_shutdown(shutdown)
        .await
}
