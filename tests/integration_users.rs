mod common;

use axum::http::StatusCode;
use common::{count_rows, create_test_user, get_auth_token, login_as, send, setup_test_app};
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_creates_staff_account(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "admin").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({
            "email": "  New.Teacher@School.com ",
            "password": "welcome123",
            "first_name": "New",
            "last_name": "Teacher",
            "role": "teacher"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["email"], "new.teacher@school.com");
    assert_eq!(body["role"], "teacher");
    assert!(body.get("password_hash").is_none());

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "new.teacher@school.com", "password": "welcome123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_user_email_rejected(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "admin").await;
    let existing = create_test_user(&pool, "teacher", true).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({
            "email": existing.email,
            "password": "welcome123",
            "first_name": "Dup",
            "last_name": "Licate",
            "role": "teacher"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(count_rows(&pool, "SELECT COUNT(*) FROM users").await, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_principal_cannot_manage_users(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "principal").await;

    let (status, _) = send(&app, "GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({
            "email": "x@school.com",
            "password": "welcome123",
            "first_name": "X",
            "last_name": "Y",
            "role": "admin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(count_rows(&pool, "SELECT COUNT(*) FROM users").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_cannot_deactivate_self(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "admin", true).await;
    let token = get_auth_token(&app, &admin.email).await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/users/{}", admin.id),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You cannot deactivate your own account");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_cannot_deactivate_self_through_update(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "admin", true).await;
    let token = get_auth_token(&app, &admin.email).await;
    let uri = format!("/api/users/{}", admin.id);

    let (status, body) =
        send(&app, "PUT", &uri, Some(&token), Some(json!({ "is_active": false }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You cannot deactivate your own account");

    let (status, _) = send(&app, "GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        send(&app, "PUT", &uri, Some(&token), Some(json!({ "first_name": "Still" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Still");
    assert_eq!(body["is_active"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivated_user_hidden_from_list_and_locked_out(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "admin").await;
    let staff = create_test_user(&pool, "receptionist", true).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/users/{}", staff.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(&app, "GET", "/api/users", Some(&token), None).await;
    assert_eq!(list["meta"]["total"], 1);

    let (_, list) = send(
        &app,
        "GET",
        "/api/users?role=receptionist&include_inactive=true",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(list["meta"]["total"], 1);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": staff.email, "password": common::PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_user_role(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "admin").await;
    let staff = create_test_user(&pool, "teacher", true).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/users/{}", staff.id),
        Some(&token),
        Some(json!({ "role": "principal" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "principal");
    assert_eq!(body["email"], staff.email);
}
