//! End-to-end registry behaviour through the public router, backed by an
//! on-disk SQLite database.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use registry_service::{
    api::{create_router, SharedStore},
    RegistryStore, SqliteStore,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower::util::ServiceExt;

fn router_for(path: &Path) -> Router {
    let store: SharedStore = Arc::new(SqliteStore::open(path).unwrap());
    create_router(store)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn registrations_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("registry.db");

    {
        let app = router_for(&db);
        for (name, endpoint) in [
            ("billing", "http://billing.local"),
            ("search", "search.internal:9200"),
        ] {
            let (status, body) = call(
                &app,
                "POST",
                "/register/system",
                Some(json!({"systemName": name, "applicationEndpoint": endpoint})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({"id": 1}));
        }

        let (status, _) = call(
            &app,
            "POST",
            "/register/topic",
            Some(json!({
                "topicName": "orders.created",
                "description": "Emitted when an order is placed",
                "owner": "billing",
                "structure": "{\"orderId\":\"string\"}"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let app = router_for(&db);

    let (status, systems) = call(&app, "GET", "/view/system", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        systems,
        json!([
            {"systemName": "billing", "applicationEndpoint": "http://billing.local"},
            {"systemName": "search", "applicationEndpoint": "search.internal:9200"}
        ])
    );

    let (status, topics) = call(&app, "GET", "/view/topic", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(topics[0]["topicName"], "orders.created");
    assert_eq!(topics[0]["subscribers"], json!([]));
}

#[tokio::test]
async fn concurrent_first_registrations_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open(dir.path().join("registry.db")).unwrap());
    let app = create_router(store.clone());

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            call(
                &app,
                "POST",
                "/register/system",
                Some(json!({
                    "systemName": format!("system-{}", i),
                    "applicationEndpoint": format!("http://system-{}.local", i)
                })),
            )
            .await
            .0
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(store.list_systems().await.unwrap().len(), 8);
}

#[tokio::test]
async fn rejected_requests_leave_no_trace() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open(dir.path().join("registry.db")).unwrap());
    let app = create_router(store.clone());

    let (status, _) = call(&app, "GET", "/register/system", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        "POST",
        "/register/system",
        Some(json!({"applicationEndpoint": "http://nameless"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Error decoding POST body"}));

    let (status, body) = call(&app, "GET", "/view/system", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    assert!(store.list_systems().await.unwrap().is_empty());
}
