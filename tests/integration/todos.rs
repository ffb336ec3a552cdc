//! To-do resource behavior over HTTP.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use todo_service::store::{Priority, TodoItem};

use crate::common::TestApp;

fn item(id: i64, title: &str, description: &str) -> TodoItem {
    TodoItem {
        id,
        title: title.to_string(),
        description: description.to_string(),
        completed: false,
        priority: Priority::None,
    }
}

#[tokio::test]
async fn list_is_empty_without_store_file() {
    let app = TestApp::new();

    let response = app.get("/todos").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));
    assert!(!app.store.path().exists());
}

#[tokio::test]
async fn list_returns_stored_items() {
    let app = TestApp::new();
    app.store
        .save(&[item(1, "Test", "Test description")])
        .await
        .unwrap();

    let response = app.get("/todos").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Test");
}

#[tokio::test]
async fn full_lifecycle() {
    let app = TestApp::new();

    let created = app
        .post(
            "/todos",
            json!({"id": 1, "title": "Test", "description": "d", "completed": false}),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);

    let listed = app.get("/todos").await;
    assert_eq!(
        listed.json(),
        json!([{"id": 1, "title": "Test", "description": "d", "completed": false, "priority": "none"}])
    );

    let updated = app
        .put(
            "/todos/1",
            json!({"id": 1, "title": "Updated", "description": "d2", "completed": true}),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["title"], "Updated");

    let listed = app.get("/todos").await;
    assert_eq!(
        listed.json(),
        json!([{"id": 1, "title": "Updated", "description": "d2", "completed": true, "priority": "none"}])
    );

    let deleted = app.delete("/todos/1").await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json(), json!({"message": "To-Do item deleted"}));

    assert_eq!(app.get("/todos").await.json(), json!([]));
}

#[tokio::test]
async fn create_returns_item_verbatim_and_appends() {
    let app = TestApp::new();
    app.store.save(&[item(1, "first", "a")]).await.unwrap();

    let body = json!({"id": 7, "title": "Ship", "description": "b", "completed": true, "priority": "high"});
    let response = app.post("/todos", body.clone()).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), body);

    let stored = app.store.load().await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].id, 7);
    assert_eq!(stored[1].priority, Priority::High);
}

#[tokio::test]
async fn create_allows_duplicate_ids() {
    let app = TestApp::new();
    let body = json!({"id": 1, "title": "Test", "description": "d", "completed": false});

    assert_eq!(app.post("/todos", body.clone()).await.status, StatusCode::OK);
    assert_eq!(app.post("/todos", body).await.status, StatusCode::OK);

    assert_eq!(app.store.load().await.unwrap().len(), 2);
}

#[tokio::test]
async fn create_with_missing_fields_is_422_and_does_not_touch_store() {
    let app = TestApp::new();
    app.store.save(&[item(1, "keep", "a")]).await.unwrap();
    let before = std::fs::read(app.store.path()).unwrap();

    let response = app.post("/todos", json!({"id": 1, "title": "Test"})).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json()["detail"].is_string());
    assert_eq!(std::fs::read(app.store.path()).unwrap(), before);
}

#[tokio::test]
async fn create_with_unknown_priority_is_422() {
    let app = TestApp::new();

    let response = app
        .post(
            "/todos",
            json!({"id": 1, "title": "t", "description": "d", "completed": false, "priority": "low"}),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!app.store.path().exists());
}

#[tokio::test]
async fn create_with_malformed_json_is_422() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/todos")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"id\": 1,"))
        .unwrap();

    let response = app.send_request(request).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!app.store.path().exists());
}

#[tokio::test]
async fn list_filters_by_description() {
    let app = TestApp::new();
    app.store
        .save(&[
            item(1, "a", "alice"),
            item(2, "b", "bob"),
            item(3, "c", "alice"),
            item(4, "d", "Alice"),
        ])
        .await
        .unwrap();

    let filtered = app.get("/todos?user=alice").await.json();
    let ids: Vec<i64> = filtered
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);

    let all = app.get("/todos").await.json();
    assert_eq!(all.as_array().unwrap().len(), 4);

    let empty_filter = app.get("/todos?user=").await.json();
    assert_eq!(empty_filter, all);

    let nobody = app.get("/todos?user=carol").await.json();
    assert_eq!(nobody, json!([]));
}

#[tokio::test]
async fn update_missing_id_is_404_and_store_untouched() {
    let app = TestApp::new();

    let response = app
        .put(
            "/todos/1",
            json!({"id": 1, "title": "Updated", "description": "Updated description", "completed": true}),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json(), json!({"detail": "To-Do item not found"}));
    assert!(!app.store.path().exists());
}

#[tokio::test]
async fn update_replaces_first_match_only() {
    let app = TestApp::new();
    app.store
        .save(&[item(1, "first", "a"), item(2, "other", "b"), item(1, "second", "c")])
        .await
        .unwrap();

    let response = app
        .put(
            "/todos/1",
            json!({"id": 9, "title": "new", "description": "n", "completed": true, "priority": "high"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let stored = app.store.load().await.unwrap();
    let titles: Vec<&str> = stored.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["new", "other", "second"]);
    assert_eq!(stored[0].id, 9);
    assert!(stored[0].completed);
}

#[tokio::test]
async fn update_with_invalid_body_is_422() {
    let app = TestApp::new();
    app.store.save(&[item(1, "keep", "a")]).await.unwrap();

    let response = app.put("/todos/1", json!({"title": "x"})).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.store.load().await.unwrap()[0].title, "keep");
}

#[tokio::test]
async fn non_integer_id_is_422() {
    let app = TestApp::new();

    assert_eq!(
        app.delete("/todos/abc").await.status,
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert!(!app.store.path().exists());
}

#[tokio::test]
async fn delete_removes_every_match() {
    let app = TestApp::new();
    app.store
        .save(&[item(1, "a", "x"), item(2, "b", "x"), item(1, "c", "x")])
        .await
        .unwrap();

    let response = app.delete("/todos/1").await;

    assert_eq!(response.status, StatusCode::OK);
    let stored = app.store.load().await.unwrap();
    assert_eq!(stored, vec![item(2, "b", "x")]);
}

#[tokio::test]
async fn delete_missing_id_succeeds_and_writes_store() {
    let app = TestApp::new();

    let first = app.delete("/todos/1").await;
    let second = app.delete("/todos/1").await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(first.json(), second.json());
    assert_eq!(first.json()["message"], "To-Do item deleted");
    assert_eq!(std::fs::read_to_string(app.store.path()).unwrap(), "[]");
}

#[tokio::test]
async fn corrupt_store_is_500() {
    let app = TestApp::new();
    std::fs::write(app.store.path(), "not json").unwrap();

    let response = app.get("/todos").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json(), json!({"detail": "Internal Server Error"}));
}

#[tokio::test]
async fn root_serves_html() {
    let app = TestApp::new();

    let response = app.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers[header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
    let expected =
        std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/index.html")).unwrap();
    assert_eq!(response.body.as_ref(), expected.as_slice());
}

#[tokio::test]
async fn root_without_page_is_500() {
    let app = TestApp::without_templates();

    assert_eq!(
        app.get("/").await.status,
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new();

    let response = app.get("/openapi.json").await;

    assert_eq!(response.status, StatusCode::OK);
    let doc = response.json();
    assert!(doc["paths"]["/todos"]["get"].is_object());
    assert!(doc["paths"]["/todos/{id}"]["delete"].is_object());
}
