//! Shared helpers for HTTP-level integration tests.
//!
//! Builds the application router through [`build_app_router`] so tests
//! exercise the same middleware stack (CORS, request ID, timeout, tracing,
//! panic recovery) that production uses. Requests are driven with
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use cursus_api::auth::jwt::{generate_token, JwtConfig};
use cursus_api::auth::password::hash_password;
use cursus_api::config::ServerConfig;
use cursus_api::gateway::{GatewayConfig, RazorpayGateway};
use cursus_api::router::build_app_router;
use cursus_api::state::AppState;
use cursus_core::catalog::{Lesson, Module};
use cursus_db::models::course::{Course, CreateCourse};
use cursus_db::models::user::{CreateUser, User};
use cursus_db::repositories::{CourseRepo, UserRepo};
use uuid::Uuid;

/// Gateway secret shared by tests that exercise signature verification.
pub const TEST_GATEWAY_SECRET: &str = "integration-test-gateway-secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir: std::env::temp_dir()
            .join("cursus-test-uploads")
            .to_string_lossy()
            .into_owned(),
        redis_url: None,
        jwt: JwtConfig {
            secret: "integration-test-jwt-secret".to_string(),
            expiry_hours: 24,
        },
    }
}

/// Build the application with no gateway (payment test mode), no cache, and
/// no AI collaborators.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app(pool, test_config(), false)
}

/// Build the application with a gateway configured, so the cryptographic
/// signature verification path is active. The gateway never receives HTTP
/// calls from these tests; only its shared secret is exercised.
pub fn build_test_app_with_gateway(pool: PgPool) -> Router {
    build_app(pool, test_config(), true)
}

/// Build the application with a dedicated upload directory.
pub fn build_test_app_with_upload_dir(pool: PgPool, upload_dir: &str) -> Router {
    let mut config = test_config();
    config.upload_dir = upload_dir.to_string();
    build_app(pool, config, false)
}

fn build_app(pool: PgPool, config: ServerConfig, with_gateway: bool) -> Router {
    let gateway = with_gateway.then(|| {
        Arc::new(RazorpayGateway::new(GatewayConfig {
            key_id: "rzp_test_integration".to_string(),
            key_secret: TEST_GATEWAY_SECRET.to_string(),
        }))
    });

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cache: Arc::new(cursus_cache::CacheClient::disconnected()),
        gateway,
        extractor: None,
        summarizer: None,
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    };
    app.oneshot(request).await.expect("request should complete")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), Some(token)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body), Some(token)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None, Some(token)).await
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Assert a status and return the parsed body for further checks.
pub async fn expect_status(
    response: Response<Body>,
    expected: StatusCode,
) -> serde_json::Value {
    assert_eq!(response.status(), expected);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Create a user directly in the database and mint a token for them.
pub async fn create_user_with_role(
    pool: &PgPool,
    name: &str,
    email: &str,
    role: &str,
) -> (User, String) {
    let password_hash = hash_password("seeded-password-123").expect("hashing should succeed");
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: email.to_lowercase(),
            password_hash,
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed");

    let token = generate_token(
        user.id,
        &user.name,
        &user.email,
        &user.role,
        &test_config().jwt,
    )
    .expect("token generation should succeed");

    (user, token)
}

/// Create a student with a derived email.
pub async fn create_student(pool: &PgPool, name: &str) -> (User, String) {
    let email = format!("{}@students.test", name.to_lowercase());
    create_user_with_role(pool, name, &email, "student").await
}

/// Create an admin with a derived email.
pub async fn create_admin(pool: &PgPool, name: &str) -> (User, String) {
    let email = format!("{}@staff.test", name.to_lowercase());
    create_user_with_role(pool, name, &email, "admin").await
}

/// Build a lesson value object for seeding.
pub fn lesson(title: &str, order: i32) -> Lesson {
    Lesson {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: String::new(),
        video_url: format!("https://videos.test/{order}.mp4"),
        duration: "10:00".to_string(),
        order,
        document: None,
    }
}

/// Create a course with `modules x lessons_per_module` lessons.
pub async fn create_course_with_lessons(
    pool: &PgPool,
    title: &str,
    modules: usize,
    lessons_per_module: usize,
) -> Course {
    let modules: Vec<Module> = (0..modules)
        .map(|m| Module {
            id: Uuid::new_v4(),
            title: format!("Module {}", m + 1),
            description: String::new(),
            order: m as i32 + 1,
            lessons: (0..lessons_per_module)
                .map(|l| lesson(&format!("Lesson {}.{}", m + 1, l + 1), l as i32 + 1))
                .collect(),
        })
        .collect();

    CourseRepo::create(
        pool,
        &CreateCourse {
            title: title.to_string(),
            description: "Seeded course".to_string(),
            instructor: None,
            duration: None,
            thumbnail: None,
            price: Some(50000),
            category: Some("technology".to_string()),
            modules,
            is_active: Some(true),
        },
    )
    .await
    .expect("course creation should succeed")
}
