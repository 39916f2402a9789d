//! Integration tests for shizu-be HTTP endpoints

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use helpers::{FakeFetcher, FakeProbe, TestEnv};
use serde_json::{json, Value};
use shizu_be::{build_router, AppState};
use shizu_common::config::{RtmpZone, TomlConfig};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

fn setup_app(env: &TestEnv) -> Router {
    let mut config = TomlConfig::default();
    config.stream.rtmp_zones = vec![RtmpZone {
        name: "EU".to_string(),
        server: "eu.ingest.example".to_string(),
    }];
    let exporter = env.exporter(FakeProbe::default(), Arc::new(FakeFetcher::default()));
    let state = AppState::with_exporter(env.db.clone(), env.roots.clone(), config, exporter);
    build_router(state)
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request(method, uri, body)).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, value)
}

#[tokio::test]
async fn test_health_endpoint() {
    let env = TestEnv::new().await;
    let app = setup_app(&env);

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "shizu-be");
    assert!(body["version"].is_string());
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_health_reports_closed_database() {
    let env = TestEnv::new().await;
    let app = setup_app(&env);
    env.db.close().await;

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], false);
}

#[tokio::test]
async fn test_buildinfo_and_settings() {
    let env = TestEnv::new().await;
    let app = setup_app(&env);

    let (status, body) = send(&app, "GET", "/api/buildinfo", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["git_hash"].is_string());

    let (status, body) = send(&app, "GET", "/api/settings/rtmp", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["template"], "rtmp://{server}/live/{key}");
    assert_eq!(body["zones"][0]["server"], "eu.ingest.example");

    let (_, body) = send(&app, "GET", "/api/settings/version", None).await;
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_dj_crud_and_error_shape() {
    let env = TestEnv::new().await;
    let app = setup_app(&env);

    let (status, _) = send(&app, "POST", "/api/djs", Some(json!({"name": "Alice"}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/api/djs", Some(json!({"name": "Alice"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ALREADY_EXISTS");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/djs/Alice",
        Some(json!({"public_name": "DJ Alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["public_name"], "DJ Alice");

    let (status, body) = send(&app, "PUT", "/api/djs/Alice", Some(json!({"logo": "nope"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_REFERENCE");

    let (status, _) = send(&app, "DELETE", "/api/djs/Alice", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", "/api/djs/Alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_file_root_is_validated() {
    let env = TestEnv::new().await;
    let app = setup_app(&env);

    let (status, _) = send(
        &app,
        "POST",
        "/api/files",
        Some(json!({"name": "logo", "root": "LOGOS", "file_path": "logo.png"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/files",
        Some(json!({"name": "bare", "root": "LOGOS"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_lineup_endpoints() {
    let env = TestEnv::new().await;
    env.launch().await;
    let app = setup_app(&env);

    let (status, body) = send(
        &app,
        "POST",
        "/api/events/Launch/djs/move",
        Some(json!({"index_a": 0, "index_b": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body.as_array().unwrap().iter().map(|s| s["dj"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Bob", "Cara", "Alice"]);

    let (status, body) = send(&app, "DELETE", "/api/events/Launch/djs/Bob", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["dj"], "Cara");
    assert_eq!(body[0]["position"], 0);
    assert_eq!(body[1]["dj"], "Alice");
    assert_eq!(body[1]["position"], 1);

    let (status, body) = send(
        &app,
        "POST",
        "/api/events/Launch/djs/move",
        Some(json!({"index_a": 0, "index_b": 9})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_RANGE");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/events/Launch/djs/Cara",
        Some(json!({"is_live": true, "vj": "Dana"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_live"], true);
    assert_eq!(body["position"], 0);

    let (status, body) = send(&app, "POST", "/api/events/Launch/djs", Some(json!({"dj": "Zed"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_REFERENCE");
}

#[tokio::test]
async fn test_event_lifecycle_and_export() {
    let env = TestEnv::new().await;
    env.dj("Alice").await;
    let app = setup_app(&env);

    let (status, body) = send(
        &app,
        "POST",
        "/api/events",
        Some(json!({
            "name": "Launch",
            "date": "2026-03-14",
            "start_time": "21:00",
            "djs": [{"dj": "Alice", "is_live": true}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["djs"][0]["dj"], "Alice");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/events/Launch/date-time",
        Some(json!({"date": "14.03.2026", "start_time": "21:00"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");

    let (status, body) = send(&app, "POST", "/api/events/Launch/export", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["djs"][0]["url"], "rtmp://ingest.example/live/alice-key");
    assert_eq!(body["theme"], json!({}));

    let (status, body) = send(
        &app,
        "PUT",
        "/api/events/Launch/theme",
        Some(json!({"theme": "missing"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_REFERENCE");

    let (status, _) = send(&app, "DELETE", "/api/events/Launch", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "POST", "/api/events/Launch/export", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_import_requires_path() {
    let env = TestEnv::new().await;
    let app = setup_app(&env);

    let (status, body) = send(&app, "POST", "/api/import/ledger", Some(json!({"path": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}
