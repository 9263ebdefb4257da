use std::sync::Once;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use serde_json::{json, Value};
use tower::ServiceExt;

use med_report_api::api::{create_app, AppState};
use med_report_api::config::AppConfig;
use med_report_data::database::{create_pool, DatabaseConfig};
use med_report_domain::auth::TokenConfig;

// Ensure tracing is initialized only once
static INIT: Once = Once::new();

fn initialize() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn test_config() -> AppConfig {
    AppConfig {
        port: 0,
        database: DatabaseConfig::in_memory(),
        tokens: TokenConfig::new("integration-test-secret", "medreport-api", Duration::minutes(30)),
        password_hash_rounds: 1_000,
        cors_allowed_origin: "http://localhost:8000".to_string(),
    }
}

/// App backed by in-memory repositories
fn memory_app() -> Router {
    initialize();
    let config = test_config();
    create_app(AppState::new(None, &config), &config.cors_allowed_origin)
}

/// App backed by an in-memory SQLite database
fn sqlite_app() -> Router {
    initialize();
    let config = test_config();
    let pool = create_pool(&config.database).expect("Failed to create test pool");
    create_app(AppState::new(Some(pool), &config), &config.cors_allowed_origin)
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json)
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "secret1",
            "age": 42,
            "gender": "male"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = send(&sqlite_app(), Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "MedReport Analyzer API");
    assert_eq!(body["components"]["database"]["status"], "healthy");
    assert!(body["uptime"].is_u64());
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_reports_in_memory_fallback_as_degraded() {
    let (status, body) = send(&memory_app(), Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["components"]["database"]["status"], "degraded");
}

#[tokio::test]
async fn test_register_and_login() {
    let app = sqlite_app();
    register(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"username": "alice", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["age"], 42);
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"username": "alice", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"success": false, "error": "Invalid credentials"}));
}

#[tokio::test]
async fn test_duplicate_registration() {
    let app = sqlite_app();
    register(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({"username": "alice", "email": "other@example.com", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({"username": "bob", "email": "alice@example.com", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already exists");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = memory_app();

    for (method, uri) in [
        (Method::POST, "/api/logout"),
        (Method::POST, "/api/analyze-report"),
        (Method::GET, "/api/report-history"),
        (Method::GET, "/api/user-profile"),
        (Method::POST, "/api/update-profile"),
    ] {
        let (status, body) = send(&app, method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body, json!({"success": false, "error": "Authentication required"}));
    }

    let (status, _) = send(&app, Method::GET, "/api/user-profile", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_analyze_report_and_history() {
    let app = sqlite_app();
    let token = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/analyze-report",
        Some(&token),
        Some(json!({"test_results": {"glucose": 130}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["analysis"]["condition"], "Pre-diabetes");
    assert_eq!(body["analysis"]["confidence"], 80);
    assert_eq!(body["analysis"]["abnormalities"], json!(["glucose is HIGH (130)"]));
    let first_id = body["report_id"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/analyze-report",
        Some(&token),
        Some(json!({"test_results": {"Systolic": 85, "Diastolic": 70}, "report_name": "BP check"})),
    )
    .await;
    assert_eq!(body["analysis"]["condition"], "Hypotension");
    let second_id = body["report_id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/api/report-history", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let reports = body["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["id"], second_id.as_str());
    assert_eq!(reports[0]["report_name"], "BP check");
    assert_eq!(reports[1]["id"], first_id.as_str());
    assert_eq!(reports[1]["report_name"], "Medical Report");
    assert_eq!(reports[1]["test_data"], json!({"glucose": 130}));
    assert!(reports[1]["recommendations"]
        .as_str()
        .unwrap()
        .starts_with("Monitor carbohydrate intake"));
}

#[tokio::test]
async fn test_analyze_report_rejects_empty_input() {
    let app = memory_app();
    let token = register(&app, "alice").await;

    for payload in [json!({"test_results": {}}), json!({})] {
        let (status, body) = send(&app, Method::POST, "/api/analyze-report", Some(&token), Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "error": "No test data provided"}));
    }

    let (_, body) = send(&app, Method::GET, "/api/report-history", Some(&token), None).await;
    assert!(body["reports"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_history_is_per_user() {
    let app = memory_app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    send(
        &app,
        Method::POST,
        "/api/analyze-report",
        Some(&alice),
        Some(json!({"test_results": {"cholesterol": "high"}})),
    )
    .await;

    let (_, body) = send(&app, Method::GET, "/api/report-history", Some(&bob), None).await;
    assert!(body["reports"].as_array().unwrap().is_empty());

    let (_, body) = send(&app, Method::GET, "/api/report-history", Some(&alice), None).await;
    assert_eq!(body["reports"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_profile_read_and_update() {
    let app = sqlite_app();
    let token = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/update-profile",
        Some(&token),
        Some(json!({"gender": "female"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "Profile updated"}));

    let (status, body) = send(&app, Method::GET, "/api/user-profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["age"], 42);
    assert_eq!(body["user"]["gender"], "female");
    assert!(body["user"]["joined_date"].is_string());
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = memory_app();
    let token = register(&app, "alice").await;

    let (status, body) = send(&app, Method::POST, "/api/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");

    let (status, body) = send(&app, Method::GET, "/api/user-profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token has been revoked");
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = memory_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/login")
        .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (status, body) = send(&memory_app(), Method::GET, "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/analyze-report"].is_object());
}
