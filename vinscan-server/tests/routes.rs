use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde::de::DeserializeOwned;
use tower::ServiceExt;
use vinscan_config::ApiKey;
use vinscan_core::store::{JsonFileStore, MemoryStore, RecordStore};
use vinscan_model::{AddVinResponse, ApiErrorBody, CheckVinResponse, HealthResponse};
use vinscan_server::{AppState, create_app};

const KEY: &str = "test-key";
const VIN: &str = "1HGCM82633A004352";

async fn app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store.upsert(VIN, "Silver Accord").await.unwrap();
    let app = create_app(AppState::new(store.clone(), ApiKey::from(KEY)));
    (app, store)
}

fn get(uri: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(key) = key {
        builder = builder.header("X-API-Key", key);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, key: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-API-Key", key)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json<T: DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_needs_no_key() {
    let (app, _) = app().await;
    let response = app.oneshot(get("/", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: HealthResponse = json(response).await;
    assert_eq!(body.status, "healthy");
    assert_eq!(body.records, 1);
}

#[tokio::test]
async fn check_vin_finds_enrolled_code_case_insensitively() {
    let (app, _) = app().await;
    let response = app
        .oneshot(get("/api/check_vin?vin=1hgcm82633a004352", Some(KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: CheckVinResponse = json(response).await;
    assert!(body.found);
    assert_eq!(body.description.as_deref(), Some("Silver Accord"));
    assert!(body.parsed_scan_date().is_some());
}

#[tokio::test]
async fn check_vin_reports_missing_code() {
    let (app, _) = app().await;
    let response = app
        .oneshot(get("/api/check_vin?vin=JH4KA8260MC000000", Some(KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: CheckVinResponse = json(response).await;
    assert_eq!(body, CheckVinResponse::missing());
}

#[tokio::test]
async fn check_vin_without_vin_is_bad_request() {
    let (app, _) = app().await;
    let response = app
        .oneshot(get("/api/check_vin", Some(KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ApiErrorBody = json(response).await;
    assert_eq!(body.error, "No VIN provided");
}

#[tokio::test]
async fn api_routes_require_the_key() {
    let (app, _) = app().await;

    for key in [None, Some("wrong")] {
        let response = app
            .clone()
            .oneshot(get(&format!("/api/check_vin?vin={VIN}"), key))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: ApiErrorBody = json(response).await;
        assert_eq!(body.error, "Invalid API key");
    }

    let response = app
        .oneshot(post_json(
            "/api/add_vin",
            "wrong",
            r#"{"vin_value": "JH4KA8260MC000000"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn add_vin_upserts() {
    let (app, store) = app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/add_vin",
            KEY,
            r#"{"vin_value": "jh4ka8260mc000000", "description": "Legend"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: AddVinResponse = json(response).await;
    assert!(body.success && body.created);

    let response = app
        .oneshot(post_json(
            "/api/add_vin",
            KEY,
            r#"{"vin_value": "JH4KA8260MC000000", "description": "Legend coupe"}"#,
        ))
        .await
        .unwrap();
    let body: AddVinResponse = json(response).await;
    assert!(body.success && !body.created);

    let record = store.get("JH4KA8260MC000000").await.unwrap().unwrap();
    assert_eq!(record.description, "Legend coupe");
}

#[tokio::test]
async fn add_vin_rejects_bad_input() {
    let (app, store) = app().await;

    for body in [
        r#"{"vin_value": ""}"#,
        r#"{"vin_value": "SHORT"}"#,
        r#"{"description": "no vin"}"#,
        "not json",
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/api/add_vin", KEY, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
    assert_eq!(store.len().await.unwrap(), 1);
}

#[tokio::test]
async fn file_backed_store_persists_enrollments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vins.json");
    let store = Arc::new(JsonFileStore::open(&path).await.unwrap());
    let app = create_app(AppState::new(store, ApiKey::from(KEY)));

    let response = app
        .oneshot(post_json(
            "/api/add_vin",
            KEY,
            r#"{"vin_value": "JH4KA8260MC000000", "description": "Legend"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reopened = JsonFileStore::open(&path).await.unwrap();
    assert!(reopened.get("JH4KA8260MC000000").await.unwrap().is_some());
}
