use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use emsu::emsu_config::{CorsConfig, JwtConfig};
use emsu::emsu_core::hash_password;
use emsu::router::init_router;
use emsu::state::AppState;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "testpass123";

#[allow(dead_code)]
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub role: &'static str,
}

pub fn setup_test_app(pool: SqlitePool) -> Router {
    let state = AppState::new(
        pool,
        JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry: 3600,
        },
        CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    );
    init_router(state, None)
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

/// Inserts a user with [`PASSWORD`] and the given role.
pub async fn create_test_user(pool: &SqlitePool, role: &'static str, is_active: bool) -> TestUser {
    let email = generate_unique_email();
    let hashed = hash_password(PASSWORD).unwrap();

    let id = sqlx::query(
        "INSERT INTO users (email, password_hash, first_name, last_name, role, is_active) \
         VALUES (?, ?, 'Test', 'User', ?, ?)",
    )
    .bind(&email)
    .bind(&hashed)
    .bind(role)
    .bind(is_active)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid();

    TestUser { id, email, role }
}

pub async fn get_auth_token(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

/// Creates an active user with `role` and returns its token.
#[allow(dead_code)]
pub async fn login_as(app: &Router, pool: &SqlitePool, role: &'static str) -> String {
    let user = create_test_user(pool, role, true).await;
    get_auth_token(app, &user.email).await
}

/// Sends a request and returns the status and the JSON body (`Null` when
/// empty).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[allow(dead_code)]
pub fn student_payload(student_id: &str, email: &str) -> Value {
    json!({
        "student_id": student_id,
        "first_name": "Amara",
        "last_name": "Okafor",
        "email": email,
        "grade": "Grade 9",
        "phone": "555-0101",
        "guardian_name": "Ngozi Okafor"
    })
}

#[allow(dead_code)]
pub async fn count_rows(pool: &SqlitePool, sql: &str) -> i64 {
    sqlx::query_scalar(sql).fetch_one(pool).await.unwrap()
}
