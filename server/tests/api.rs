use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use todo_server::{app, MemoryStore, PriorityStats, TodoItem};
use tower::ServiceExt;

fn memory_app() -> Router {
    app(Arc::new(MemoryStore::new()))
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

/// Sends one request through a clone of `app`; state is shared via the store.
async fn send(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn create(app: &Router, title: &str, description: Option<&str>, priority: &str) -> TodoItem {
    let body = serde_json::json!({
        "title": title,
        "description": description,
        "priority": priority,
    });
    let resp = send(app, json_request("POST", "/todos/", &body.to_string())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

// --- root / health ---

#[tokio::test]
async fn root_returns_welcome_message() {
    let resp = send(&memory_app(), empty_request("GET", "/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Welcome to the Todo List API");
}

#[tokio::test]
async fn health_returns_ok() {
    let resp = send(&memory_app(), empty_request("GET", "/health/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "status": "OK" }));
}

// --- create ---

#[tokio::test]
async fn create_assigns_id_and_round_trips() {
    let app = memory_app();
    let created = create(&app, "Buy milk", None, "Low").await;
    assert!(!created.id.is_empty());

    let resp = send(&app, empty_request("GET", &format!("/todos/{}", created.id))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: TodoItem = body_json(resp).await;
    assert_eq!(fetched, created);
    assert_eq!(fetched.title, "Buy milk");
    assert_eq!(fetched.priority.as_str(), "Low");
}

#[tokio::test]
async fn create_ignores_client_id() {
    let app = memory_app();
    let resp = send(
        &app,
        json_request(
            "POST",
            "/todos/",
            r#"{"id":"mine","title":"t","priority":"High"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: TodoItem = body_json(resp).await;
    assert_ne!(created.id, "mine");
}

#[tokio::test]
async fn create_with_invalid_priority_is_rejected_and_not_stored() {
    let app = memory_app();
    let resp = send(
        &app,
        json_request("POST", "/todos/", r#"{"title":"t","priority":"Urgent"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Invalid priority level");

    let resp = send(&app, empty_request("GET", "/todos/count/")).await;
    let count: u64 = body_json(resp).await;
    assert_eq!(count, 0);
}

#[tokio::test]
async fn create_malformed_json_returns_422() {
    let app = memory_app();
    for body in [r#"{"not_title":1}"#, r#"{"title": "x", "priority": "Low""#, "not json"] {
        let resp = send(&app, json_request("POST", "/todos/", body)).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "body: {body}");
        let detail: Value = body_json(resp).await;
        assert!(detail["detail"].is_string(), "body: {body}");
    }

    let count: u64 = body_json(send(&app, empty_request("GET", "/todos/count/")).await).await;
    assert_eq!(count, 0);
}

#[tokio::test]
async fn missing_content_type_returns_415_with_detail() {
    let request = Request::builder()
        .method("POST")
        .uri("/todos/")
        .body(r#"{"title": "x", "priority": "Low"}"#.to_string())
        .unwrap();
    let resp = send(&memory_app(), request).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = body_json(resp).await;
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn import_with_broken_json_returns_422_and_stores_nothing() {
    let app = memory_app();
    let body = r#"[{"title": "a", "priority": "Low"}, {"title": "#;
    let resp = send(&app, json_request("POST", "/todos/import/", body)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let detail: Value = body_json(resp).await;
    assert!(detail["detail"].is_string());

    let count: u64 = body_json(send(&app, empty_request("GET", "/todos/count/")).await).await;
    assert_eq!(count, 0);
}

// --- get / update / delete ---

#[tokio::test]
async fn get_unknown_id_returns_404() {
    let resp = send(&memory_app(), empty_request("GET", "/todos/does-not-exist")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Item not found");
}

#[tokio::test]
async fn update_applies_fields_and_keeps_id() {
    let app = memory_app();
    let created = create(&app, "Walk dog", None, "Low").await;

    let resp = send(
        &app,
        json_request(
            "PUT",
            &format!("/todos/{}", created.id),
            r#"{"id":"ignored","title":"Walk cat","description":"twice","priority":"High"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: TodoItem = body_json(resp).await;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Walk cat");
    assert_eq!(updated.description.as_deref(), Some("twice"));
    assert_eq!(updated.priority.as_str(), "High");

    let resp = send(&app, empty_request("GET", &format!("/todos/{}", created.id))).await;
    let fetched: TodoItem = body_json(resp).await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_unknown_id_returns_404() {
    let resp = send(
        &memory_app(),
        json_request("PUT", "/todos/nope", r#"{"title":"t","priority":"Low"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_with_invalid_priority_leaves_item_unchanged() {
    let app = memory_app();
    let created = create(&app, "t", None, "Low").await;

    let resp = send(
        &app,
        json_request(
            "PUT",
            &format!("/todos/{}", created.id),
            r#"{"title":"changed","priority":"Someday"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&app, empty_request("GET", &format!("/todos/{}", created.id))).await;
    let fetched: TodoItem = body_json(resp).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn delete_then_get_returns_404() {
    let app = memory_app();
    let created = create(&app, "t", None, "Medium").await;

    let resp = send(&app, empty_request("DELETE", &format!("/todos/{}", created.id))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Item deleted");

    let resp = send(&app, empty_request("GET", &format!("/todos/{}", created.id))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&app, empty_request("DELETE", &format!("/todos/{}", created.id))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_all_empties_the_list() {
    let app = memory_app();
    create(&app, "a", None, "Low").await;
    create(&app, "b", None, "High").await;

    let resp = send(&app, empty_request("DELETE", "/todos/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "All items deleted");
    assert_eq!(body["deleted"], 2);

    let resp = send(&app, empty_request("GET", "/todos/")).await;
    let todos: Vec<TodoItem> = body_json(resp).await;
    assert!(todos.is_empty());
}

// --- queries ---

#[tokio::test]
async fn list_preserves_insertion_order() {
    let app = memory_app();
    let a = create(&app, "a", None, "Low").await;
    let b = create(&app, "b", None, "High").await;
    let c = create(&app, "c", None, "Medium").await;

    let resp = send(&app, empty_request("GET", "/todos/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<TodoItem> = body_json(resp).await;
    assert_eq!(todos, vec![a, b, c]);
}

#[tokio::test]
async fn priority_filter_and_counts_agree() {
    let app = memory_app();
    create(&app, "a", None, "Low").await;
    create(&app, "b", None, "High").await;
    create(&app, "c", None, "High").await;

    let resp = send(&app, empty_request("GET", "/todos/priority/High")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let high: Vec<TodoItem> = body_json(resp).await;
    assert_eq!(high.len(), 2);
    assert!(high.iter().all(|item| item.priority.as_str() == "High"));

    for (level, expected) in [("Low", 1), ("Medium", 0), ("High", 2)] {
        let resp = send(
            &app,
            empty_request("GET", &format!("/todos/count/priority/{level}")),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let count: u64 = body_json(resp).await;
        assert_eq!(count, expected, "{level}");
    }

    let resp = send(&app, empty_request("GET", "/todos/count/")).await;
    let count: u64 = body_json(resp).await;
    assert_eq!(count, 3);
}

#[tokio::test]
async fn invalid_level_returns_400() {
    let app = memory_app();
    for uri in ["/todos/priority/Urgent", "/todos/count/priority/low"] {
        let resp = send(&app, empty_request("GET", uri)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: Value = body_json(resp).await;
        assert_eq!(body["detail"], "Invalid priority level");
    }
}

#[tokio::test]
async fn search_matches_title_and_description_case_insensitively() {
    let app = memory_app();
    create(&app, "Buy MILK", None, "Low").await;
    create(&app, "Errands", Some("pick up milk and bread"), "Medium").await;
    create(&app, "Walk dog", None, "High").await;

    let resp = send(&app, empty_request("GET", "/todos/search/?query=Milk")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let found: Vec<TodoItem> = body_json(resp).await;
    let titles: Vec<&str> = found.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["Buy MILK", "Errands"]);

    let resp = send(&app, empty_request("GET", "/todos/search/?query=bread%20")).await;
    let found: Vec<TodoItem> = body_json(resp).await;
    assert!(found.is_empty());
}

#[tokio::test]
async fn search_without_query_returns_400() {
    let resp = send(&memory_app(), empty_request("GET", "/todos/search/")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_include_every_level() {
    let app = memory_app();
    let resp = send(&app, empty_request("GET", "/todos/stats/")).await;
    let body: Value = body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "Low": 0, "Medium": 0, "High": 0 }));

    create(&app, "a", None, "Medium").await;
    create(&app, "b", None, "Medium").await;
    let resp = send(&app, empty_request("GET", "/todos/stats/")).await;
    let stats: PriorityStats = body_json(resp).await;
    assert_eq!((stats.low, stats.medium, stats.high), (0, 2, 0));
}

#[tokio::test]
async fn duplicates_exclude_first_occurrence() {
    let app = memory_app();
    let first = create(&app, "a", Some("x"), "Low").await;
    create(&app, "a", None, "Low").await;
    let repeat = create(&app, "a", Some("x"), "Low").await;

    let resp = send(&app, empty_request("GET", "/todos/duplicates/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let dups: Vec<TodoItem> = body_json(resp).await;
    assert_eq!(dups, vec![repeat]);
    assert!(!dups.contains(&first));
}

#[tokio::test]
async fn duplicate_check_compares_full_tuple() {
    let app = memory_app();
    create(&app, "a", Some("x"), "Low").await;

    let cases = [
        (r#"{"title":"a","description":"x","priority":"Low"}"#, true),
        (r#"{"title":"a","priority":"Low"}"#, false),
        (r#"{"title":"a","description":"x","priority":"High"}"#, false),
    ];
    for (body, expected) in cases {
        let resp = send(&app, json_request("POST", "/todos/duplicate_check/", body)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let exists: bool = body_json(resp).await;
        assert_eq!(exists, expected, "{body}");
    }

    let resp = send(
        &app,
        json_request(
            "POST",
            "/todos/duplicate_check/",
            r#"{"title":"a","priority":"Urgent"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- import / export ---

#[tokio::test]
async fn import_assigns_fresh_ids_and_export_matches_list() {
    let app = memory_app();
    let resp = send(
        &app,
        json_request(
            "POST",
            "/todos/import/",
            r#"[{"id":"same","title":"a","priority":"Low"},
                {"id":"same","title":"b","description":"d","priority":"High"}]"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let imported: Vec<TodoItem> = body_json(resp).await;
    assert_eq!(imported.len(), 2);
    assert!(imported.iter().all(|item| item.id != "same"));
    assert_ne!(imported[0].id, imported[1].id);

    let resp = send(&app, empty_request("GET", "/todos/export/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let exported: Vec<TodoItem> = body_json(resp).await;
    assert_eq!(exported, imported);
}

#[tokio::test]
async fn import_with_invalid_item_stores_nothing() {
    let app = memory_app();
    let resp = send(
        &app,
        json_request(
            "POST",
            "/todos/import/",
            r#"[{"title":"ok","priority":"Low"},
                {"title":"bad","priority":"Whenever"},
                {"title":"also ok","priority":"High"}]"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Invalid priority level for item: bad");

    let resp = send(&app, empty_request("GET", "/todos/")).await;
    let todos: Vec<TodoItem> = body_json(resp).await;
    assert!(todos.is_empty());
}
