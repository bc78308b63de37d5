//! Integration tests for saturno-api endpoints
//!
//! Tests cover:
//! - Quiz CRUD over /api/quizzes (list, categories, get, create, update, delete)
//! - Validation and not-found semantics
//! - Success/error envelope shape
//! - Store failure translation per environment
//! - Health, build info, fallback, CORS and security headers

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use bson::oid::ObjectId;
use saturno_api::db::{MemoryQuizStore, QuizStore};
use saturno_api::{build_router, AppState, BODY_LIMIT_BYTES};
use saturno_common::config::{Environment, ServerConfig};
use saturno_common::{Error, NewQuiz, Quiz, QuizUpdate, Result};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

/// Store whose every call fails, for 500 paths
struct FailingStore;

#[async_trait]
impl QuizStore for FailingStore {
    async fn list(&self) -> Result<Vec<Quiz>> {
        Err(Error::Internal("store offline".to_string()))
    }
    async fn categories(&self) -> Result<Vec<String>> {
        Err(Error::Internal("store offline".to_string()))
    }
    async fn get(&self, _id: ObjectId) -> Result<Option<Quiz>> {
        Err(Error::Internal("store offline".to_string()))
    }
    async fn create(&self, _quiz: NewQuiz) -> Result<Quiz> {
        Err(Error::Internal("store offline".to_string()))
    }
    async fn update(&self, _id: ObjectId, _update: QuizUpdate) -> Result<Option<Quiz>> {
        Err(Error::Internal("store offline".to_string()))
    }
    async fn delete(&self, _id: ObjectId) -> Result<Option<Quiz>> {
        Err(Error::Internal("store offline".to_string()))
    }
    async fn ping(&self) -> Result<()> {
        Err(Error::Internal("store offline".to_string()))
    }
}

/// Test helper: app over a fresh in-memory store
fn setup_app() -> Router {
    let state = AppState::new(Arc::new(MemoryQuizStore::new()), ServerConfig::default());
    build_router(state)
}

/// Test helper: app over a store that always fails
fn setup_failing_app(environment: Environment) -> Router {
    let config = ServerConfig {
        environment,
        ..Default::default()
    };
    build_router(AppState::new(Arc::new(FailingStore), config))
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn quiz_body(category: &str, question: &str) -> Value {
    json!({
        "answers": [
            {"isCorrect": true, "text": "Master Sword"},
            {"isCorrect": false, "text": "Kokiri Sword"}
        ],
        "category": category,
        "gameName": "Twilight Princess",
        "lore": "The blade of evil's bane",
        "question": question,
        "saga": "The Legend of Zelda",
        "source": "In-game"
    })
}

/// Test helper: create a quiz and return its JSON representation
async fn create(app: &Router, category: &str, question: &str) -> Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/quizzes", &quiz_body(category, question)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    extract_json(response).await["data"].clone()
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_quiz_returns_created_record() {
    let app = setup_app();

    let quiz = create(&app, "Weapons", "Which sword repels evil?").await;

    assert_eq!(quiz["_id"].as_str().unwrap().len(), 24);
    assert_eq!(quiz["gameName"], "Twilight Princess");
    assert_eq!(quiz["answers"][0]["isCorrect"], true);
    assert_eq!(quiz["answers"][1]["text"], "Kokiri Sword");
    assert!(quiz["createdAt"].is_string());
    assert_eq!(quiz["createdAt"], quiz["updatedAt"]);
}

#[tokio::test]
async fn test_create_quiz_missing_field_is_bad_request() {
    let app = setup_app();
    let mut body = quiz_body("Weapons", "Q");
    body.as_object_mut().unwrap().remove("saga");

    let response = app
        .oneshot(json_request("POST", "/api/quizzes", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "All fields are required");
}

#[tokio::test]
async fn test_create_quiz_malformed_json_is_bad_request() {
    let app = setup_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/quizzes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"category\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_quiz_answer_without_flag_is_bad_request() {
    let app = setup_app();
    let mut body = quiz_body("Weapons", "Q");
    body["answers"] = json!([{"text": "Master Sword"}]);

    let response = app
        .oneshot(json_request("POST", "/api/quizzes", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(extract_json(response).await["success"], false);
}

#[tokio::test]
async fn test_create_quiz_without_content_type_is_unsupported_media_type() {
    let app = setup_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/quizzes")
        .body(Body::from(quiz_body("Weapons", "Q").to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = extract_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_quiz_over_body_limit_is_payload_too_large() {
    let app = setup_app();
    let mut body = quiz_body("Weapons", "Q");
    body["lore"] = json!("x".repeat(BODY_LIMIT_BYTES + 1024 * 1024));

    let response = app
        .oneshot(json_request("POST", "/api/quizzes", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = extract_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

// =============================================================================
// Read
// =============================================================================

#[tokio::test]
async fn test_list_quizzes_empty() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/api/quizzes")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_list_quizzes_newest_first() {
    let app = setup_app();
    create(&app, "Weapons", "first").await;
    create(&app, "Weapons", "second").await;

    let response = app.oneshot(test_request("GET", "/api/quizzes")).await.unwrap();
    let body = extract_json(response).await;

    let questions: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["question"].as_str().unwrap())
        .collect();
    assert_eq!(questions, vec!["second", "first"]);
}

#[tokio::test]
async fn test_list_categories_distinct_sorted() {
    let app = setup_app();
    create(&app, "Weapons", "a").await;
    create(&app, "Characters", "b").await;
    create(&app, "Weapons", "c").await;

    let response = app
        .oneshot(test_request("GET", "/api/quizzes/categories"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["data"], json!(["Characters", "Weapons"]));
}

#[tokio::test]
async fn test_get_quiz_by_id() {
    let app = setup_app();
    let quiz = create(&app, "Weapons", "Q").await;
    let uri = format!("/api/quizzes/{}", quiz["_id"].as_str().unwrap());

    let response = app.oneshot(test_request("GET", &uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["data"], quiz);
}

#[tokio::test]
async fn test_get_unknown_quiz_is_not_found() {
    let app = setup_app();
    let uri = format!("/api/quizzes/{}", ObjectId::new().to_hex());

    let response = app.oneshot(test_request("GET", &uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Quiz not found");
}

#[tokio::test]
async fn test_get_malformed_id_is_bad_request() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/quizzes/not-an-object-id"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response).await;
    assert_eq!(body["error"], "Invalid quiz id: not-an-object-id");
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_quiz_changes_only_given_fields() {
    let app = setup_app();
    let quiz = create(&app, "Weapons", "Q").await;
    let uri = format!("/api/quizzes/{}", quiz["_id"].as_str().unwrap());

    let response = app
        .clone()
        .oneshot(json_request("PUT", &uri, &json!({"category": "Items"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let updated = extract_json(response).await["data"].clone();
    assert_eq!(updated["category"], "Items");
    assert_eq!(updated["question"], "Q");
    assert_eq!(updated["createdAt"], quiz["createdAt"]);

    // Persisted
    let response = app.oneshot(test_request("GET", &uri)).await.unwrap();
    let body = extract_json(response).await;
    assert_eq!(body["data"]["category"], "Items");
}

#[tokio::test]
async fn test_update_with_empty_body_is_bad_request() {
    let app = setup_app();
    let quiz = create(&app, "Weapons", "Q").await;
    let uri = format!("/api/quizzes/{}", quiz["_id"].as_str().unwrap());

    let response = app.oneshot(json_request("PUT", &uri, &json!({}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response).await;
    assert_eq!(body["error"], "Update requires at least one field");
}

#[tokio::test]
async fn test_update_unknown_quiz_is_not_found() {
    let app = setup_app();
    let uri = format!("/api/quizzes/{}", ObjectId::new().to_hex());

    let response = app
        .oneshot(json_request("PUT", &uri, &json!({"lore": "Rewritten"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_quiz_then_gone() {
    let app = setup_app();
    let quiz = create(&app, "Weapons", "Q").await;
    let uri = format!("/api/quizzes/{}", quiz["_id"].as_str().unwrap());

    let response = app.clone().oneshot(test_request("DELETE", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());

    let response = app.clone().oneshot(test_request("GET", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(test_request("DELETE", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Store failures
// =============================================================================

#[tokio::test]
async fn test_store_failure_in_development_includes_details() {
    let app = setup_failing_app(Environment::Development);

    let response = app.oneshot(test_request("GET", "/api/quizzes")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Error retrieving quizzes");
    assert_eq!(body["details"], "Internal error: store offline");
}

#[tokio::test]
async fn test_store_failure_in_production_hides_details() {
    let app = setup_failing_app(Environment::Production);

    let response = app
        .oneshot(json_request("POST", "/api/quizzes", &quiz_body("Weapons", "Q")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response).await;
    assert_eq!(body["error"], "Error creating quiz");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_validation_runs_before_store() {
    let app = setup_failing_app(Environment::Production);

    let response = app
        .oneshot(json_request("POST", "/api/quizzes", &json!({"category": "Weapons"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_store_failure_messages_per_operation() {
    let id = ObjectId::new().to_hex();
    let cases = [
        (test_request("GET", "/api/quizzes/categories"), "Error retrieving categories"),
        (test_request("GET", &format!("/api/quizzes/{}", id)), "Error retrieving quiz"),
        (
            json_request("PUT", &format!("/api/quizzes/{}", id), &json!({"saga": "Zelda"})),
            "Error updating quiz",
        ),
        (test_request("DELETE", &format!("/api/quizzes/{}", id)), "Error deleting quiz"),
    ];

    for (request, expected) in cases {
        let response = setup_failing_app(Environment::Production)
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(extract_json(response).await["error"], expected);
    }
}

// =============================================================================
// Ambient routes and middleware
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Server is healthy");
    assert_eq!(body["module"], "saturno-api");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_build_info_endpoint() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/api/buildinfo")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["data"]["git_hash"].is_string());
}

#[tokio::test]
async fn test_unknown_route_uses_error_envelope() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/api/unknown")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Route /api/unknown not found");
}

#[tokio::test]
async fn test_unsupported_method_uses_error_envelope() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(test_request("PATCH", "/api/quizzes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = extract_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Method PATCH not allowed on /api/quizzes");

    let response = app
        .oneshot(test_request("POST", "/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(extract_json(response).await["success"], false);
}

#[tokio::test]
async fn test_wildcard_origin_does_not_break_router() {
    let config = ServerConfig {
        cors_origins: vec!["*".to_string(), "http://localhost:3000".to_string()],
        ..Default::default()
    };
    let app = build_router(AppState::new(Arc::new(MemoryQuizStore::new()), config));

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-xss-protection"], "1; mode=block");
}

#[tokio::test]
async fn test_cors_preflight_for_configured_origin() {
    let app = setup_app();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/quizzes")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn test_cors_ignores_unlisted_origin() {
    let app = setup_app();
    let request = Request::builder()
        .method("GET")
        .uri("/api/quizzes")
        .header(header::ORIGIN, "http://evil.test")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
