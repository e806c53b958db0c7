//! End-to-end API tests over an in-memory database

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use atrium::api::{build_router, AppState};
use atrium::config::Config;
use atrium::db::repositories::{AdminRepository, SqlxAdminRepository};
use atrium::db::{create_test_pool, migrations};
use atrium::services::password::hash_secret;

async fn spawn_server() -> TestServer {
    let pool = create_test_pool().await.unwrap();
    migrations::run_migrations(&pool).await.unwrap();

    SqlxAdminRepository::new(pool.clone())
        .create("admin1", "admin1@mail.com", &hash_secret("Admin1Pass").unwrap())
        .await
        .unwrap();

    let mut config = Config::default();
    config.upload.path = std::env::temp_dir().join("atrium-test-uploads");

    let state = AppState::new(pool, &config);
    TestServer::new(build_router(state, &config.server).unwrap()).unwrap()
}

async fn login(server: &TestServer) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "admin1", "password": "Admin1Pass" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    body["data"]["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let server = spawn_server().await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "admin1", "password": "wrong" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let body: Value = response.json();
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let server = spawn_server().await;

    let response = server.get("/api/blogs").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server
        .get("/api/blogs")
        .authorization_bearer("not-a-token")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_token_rotates() {
    let server = spawn_server().await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "admin1", "password": "Admin1Pass" }))
        .await;
    let body: Value = response.json();
    let first_refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

    let response = server
        .post("/api/auth/refresh-token")
        .json(&json!({ "refresh_token": first_refresh }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let second_refresh = body["data"]["refresh_token"].as_str().unwrap();
    assert_ne!(second_refresh, first_refresh);

    // The rotated-out token is no longer accepted
    let response = server
        .post("/api/auth/refresh-token")
        .json(&json!({ "refresh_token": first_refresh }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn blog_crud_flow() {
    let server = spawn_server().await;
    let token = login(&server).await;

    // Create
    let response = server
        .post("/api/blogs")
        .authorization_bearer(&token)
        .json(&json!({ "title": "Hello World!", "content": "First post" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Blog created successfully");
    assert_eq!(body["data"]["slug"], "hello-world");
    assert_eq!(body["data"]["author"], "admin1");
    let id = body["data"]["id"].as_i64().unwrap();

    // Duplicate title maps to 400
    let response = server
        .post("/api/blogs")
        .authorization_bearer(&token)
        .json(&json!({ "title": "Hello, World", "content": "Again" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "DUPLICATE");

    // List carries total
    let response = server.get("/api/blogs").authorization_bearer(&token).await;
    let body: Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Patch
    let response = server
        .patch(&format!("/api/blogs/{}", id))
        .authorization_bearer(&token)
        .json(&json!({ "content": "Edited" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["content"], "Edited");
    assert_eq!(body["data"]["slug"], "hello-world");

    // Delete, then 404
    let response = server
        .delete(&format!("/api/blogs/{}", id))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .get(&format!("/api/blogs/{}", id))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn contact_submission_is_public() {
    let server = spawn_server().await;

    let response = server
        .post("/api/contact-us")
        .json(&json!({
            "first_name": "john",
            "last_name": "doe",
            "email": "john@example.com",
            "phone_number": "+62 812 0000",
            "message": "Requesting a quote"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["full_name"], "John Doe");

    // Reading messages stays admin-only
    let response = server.get("/api/contact-us").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let token = login(&server).await;
    let response = server
        .get("/api/contact-us")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn media_names_deduplicate_with_suffixes() {
    let server = spawn_server().await;
    let token = login(&server).await;

    for expected in ["Logo", "Logo(1)", "Logo(2)"] {
        let response = server
            .post("/api/media")
            .authorization_bearer(&token)
            .json(&json!({ "name": "Logo", "url": "http://x/logo.png", "size": "1 KB" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["name"], expected);
    }

    let response = server.get("/api/media").authorization_bearer(&token).await;
    let body: Value = response.json();
    assert_eq!(body["total"], 3);
    assert!(body["newest"].is_string());
}

#[tokio::test]
async fn item_kinds_are_scoped_by_mount_point() {
    let server = spawn_server().await;
    let token = login(&server).await;

    let response = server
        .post("/api/business")
        .authorization_bearer(&token)
        .json(&json!({ "title": "Mining", "description": "Ore" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let business_id = body["data"]["id"].as_i64().unwrap();

    // Same title as a product and as a service
    for path in ["/api/products", "/api/services"] {
        let response = server
            .post(path)
            .authorization_bearer(&token)
            .json(&json!({
                "title": "Survey",
                "description": "Site survey",
                "business_id": business_id
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK, "POST {}", path);
    }

    // Each mount point only sees its own kind
    let response = server
        .get("/api/products/survey")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["kind"], "product");

    let response = server
        .get("/api/projects/survey")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn document_category_is_validated() {
    let server = spawn_server().await;
    let token = login(&server).await;

    let response = server
        .post("/api/documents")
        .authorization_bearer(&token)
        .json(&json!({
            "name": "Diploma",
            "category": "diploma",
            "url": "http://x/d.pdf",
            "size": "10 KB"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn one_sided_date_filter_is_ignored_and_malformed_rejected() {
    let server = spawn_server().await;
    let token = login(&server).await;

    let response = server
        .get("/api/blogs")
        .add_query_param("start_date", "2024-01-01")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .get("/api/blogs")
        .add_query_param("start_date", "01-01-2024")
        .add_query_param("end_date", "2024-02-01")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_window_params_filter_blogs() {
    let server = spawn_server().await;
    let token = login(&server).await;

    let response = server
        .post("/api/blogs")
        .authorization_bearer(&token)
        .json(&json!({ "title": "Windowed", "content": "body" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // A fresh post was last edited today
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let response = server
        .get("/api/blogs")
        .add_query_param("update_start_date", &today)
        .add_query_param("update_end_date", &today)
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["total"], 1);

    let response = server
        .get("/api/blogs")
        .add_query_param("update_start_date", "2001-01-01")
        .add_query_param("update_end_date", "2001-01-02")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn logout_clears_session() {
    let server = spawn_server().await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "admin1", "password": "Admin1Pass" }))
        .await;
    let body: Value = response.json();
    let access = body["data"]["access_token"].as_str().unwrap().to_string();
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

    let response = server
        .post("/api/auth/logout")
        .authorization_bearer(&access)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .post("/api/auth/refresh-token")
        .json(&json!({ "refresh_token": refresh }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_endpoint_is_open() {
    let server = spawn_server().await;
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}
