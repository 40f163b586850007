//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{DeleteSummary, Priority, PriorityStats, TodoInput, TodoItem};

#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get(&self, path: &str) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Get, self.url(path))
    }

    fn with_json<T: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest::json(method, self.url(path), body))
    }

    // --- service ---

    pub fn build_root(&self) -> HttpRequest {
        self.get("/")
    }

    /// Returns the welcome message.
    pub fn parse_root(&self, response: HttpResponse) -> Result<String, ApiError> {
        #[derive(Deserialize)]
        struct Welcome {
            message: String,
        }
        parse_json::<Welcome>(&response, 200).map(|w| w.message)
    }

    pub fn build_health(&self) -> HttpRequest {
        self.get("/health/")
    }

    /// Returns the reported status string (`"OK"` when healthy).
    pub fn parse_health(&self, response: HttpResponse) -> Result<String, ApiError> {
        #[derive(Deserialize)]
        struct Health {
            status: String,
        }
        parse_json::<Health>(&response, 200).map(|h| h.status)
    }

    // --- single items ---

    pub fn build_create_todo(&self, input: &TodoInput) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, "/todos/", input)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<TodoItem, ApiError> {
        parse_json(&response, 201)
    }

    /// `id` is inserted into the path verbatim; server-issued ids are
    /// URL-safe.
    pub fn build_get_todo(&self, id: &str) -> HttpRequest {
        self.get(&format!("/todos/{id}"))
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<TodoItem, ApiError> {
        parse_json(&response, 200)
    }

    pub fn build_update_todo(&self, id: &str, input: &TodoInput) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Put, &format!("/todos/{id}"), input)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<TodoItem, ApiError> {
        parse_json(&response, 200)
    }

    pub fn build_delete_todo(&self, id: &str) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Delete, self.url(&format!("/todos/{id}")))
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 200)
    }

    // --- collections ---

    pub fn build_list_todos(&self) -> HttpRequest {
        self.get("/todos/")
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<TodoItem>, ApiError> {
        parse_json(&response, 200)
    }

    pub fn build_delete_all_todos(&self) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Delete, self.url("/todos/"))
    }

    pub fn parse_delete_all_todos(
        &self,
        response: HttpResponse,
    ) -> Result<DeleteSummary, ApiError> {
        parse_json(&response, 200)
    }

    pub fn build_todos_by_priority(&self, priority: Priority) -> HttpRequest {
        self.get(&format!("/todos/priority/{}", priority.as_str()))
    }

    pub fn parse_todos_by_priority(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<TodoItem>, ApiError> {
        parse_json(&response, 200)
    }

    pub fn build_count_todos(&self) -> HttpRequest {
        self.get("/todos/count/")
    }

    pub fn parse_count_todos(&self, response: HttpResponse) -> Result<u64, ApiError> {
        parse_json(&response, 200)
    }

    pub fn build_count_by_priority(&self, priority: Priority) -> HttpRequest {
        self.get(&format!("/todos/count/priority/{}", priority.as_str()))
    }

    pub fn parse_count_by_priority(&self, response: HttpResponse) -> Result<u64, ApiError> {
        parse_json(&response, 200)
    }

    /// The query is form-encoded into `?query=`.
    pub fn build_search_todos(&self, query: &str) -> HttpRequest {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.get(&format!("/todos/search/?query={encoded}"))
    }

    pub fn parse_search_todos(&self, response: HttpResponse) -> Result<Vec<TodoItem>, ApiError> {
        parse_json(&response, 200)
    }

    pub fn build_stats(&self) -> HttpRequest {
        self.get("/todos/stats/")
    }

    pub fn parse_stats(&self, response: HttpResponse) -> Result<PriorityStats, ApiError> {
        parse_json(&response, 200)
    }

    pub fn build_duplicates(&self) -> HttpRequest {
        self.get("/todos/duplicates/")
    }

    pub fn parse_duplicates(&self, response: HttpResponse) -> Result<Vec<TodoItem>, ApiError> {
        parse_json(&response, 200)
    }

    pub fn build_duplicate_check(&self, input: &TodoInput) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, "/todos/duplicate_check/", input)
    }

    pub fn parse_duplicate_check(&self, response: HttpResponse) -> Result<bool, ApiError> {
        parse_json(&response, 200)
    }

    pub fn build_export(&self) -> HttpRequest {
        self.get("/todos/export/")
    }

    pub fn parse_export(&self, response: HttpResponse) -> Result<Vec<TodoItem>, ApiError> {
        parse_json(&response, 200)
    }

    pub fn build_import(&self, items: &[TodoInput]) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, "/todos/import/", items)
    }

    pub fn parse_import(&self, response: HttpResponse) -> Result<Vec<TodoItem>, ApiError> {
        parse_json(&response, 201)
    }
}

fn parse_json<T: DeserializeOwned>(response: &HttpResponse, expected: u16) -> Result<T, ApiError> {
    check_status(response, expected)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        status if status == expected => Ok(()),
        404 => Err(ApiError::NotFound),
        400 => Err(ApiError::BadRequest(detail(&response.body))),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

/// The server's `{"detail": ...}` message, or the raw body if it has none.
fn detail(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: String,
    }
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.detail)
        .unwrap_or_else(|_| body.to_string())
}
