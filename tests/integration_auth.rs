mod common;

use axum::http::StatusCode;
use common::{PASSWORD, count_rows, create_test_user, get_auth_token, send, setup_test_app};
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "./migrations")]
async fn test_login_success_records_last_login(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "teacher", true).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": user.email.to_uppercase(), "password": PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert_eq!(body["user"]["role"], "teacher");
    assert!(body["access_token"].as_str().is_some());
    assert!(body["user"].get("password_hash").is_none());

    let recorded = count_rows(
        &pool,
        &format!(
            "SELECT COUNT(*) FROM users WHERE id = {} AND last_login IS NOT NULL",
            user.id
        ),
    )
    .await;
    assert_eq!(recorded, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_wrong_password_leaves_state_untouched(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "admin", true).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": user.email, "password": "wrong-password" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
    assert_eq!(
        count_rows(&pool, "SELECT COUNT(*) FROM users WHERE last_login IS NOT NULL").await,
        0
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_unknown_email_and_inactive_user_look_the_same(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let inactive = create_test_user(&pool, "admin", false).await;

    let (status, unknown) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@test.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": inactive.email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, unknown);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_requires_token(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());

    let (status, _) = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_returns_current_user(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "accountant", true).await;
    let token = get_auth_token(&app, &user.email).await;

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user.id);
    assert_eq!(body["full_name"], "Test User");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivated_user_token_is_denied(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "admin", true).await;
    let token = get_auth_token(&app, &user.email).await;

    sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    for uri in ["/api/subjects", "/api/students", "/api/users", "/api/dashboard/stats"] {
        let (status, body) = send(&app, "GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["error"], "Access denied");
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_profile_keeps_email_and_role(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "receptionist", true).await;
    let token = get_auth_token(&app, &user.email).await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/auth/profile",
        Some(&token),
        Some(json!({ "first_name": "Renamed", "phone": "555-0199" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Renamed");
    assert_eq!(body["last_name"], "User");
    assert_eq!(body["phone"], "555-0199");
    assert_eq!(body["email"], user.email);
    assert_eq!(body["role"], "receptionist");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_change_password(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "teacher", true).await;
    let token = get_auth_token(&app, &user.email).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/change-password",
        Some(&token),
        Some(json!({ "current_password": "not-it", "new_password": "brand-new-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Current password is incorrect");

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/change-password",
        Some(&token),
        Some(json!({ "current_password": PASSWORD, "new_password": "brand-new-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": user.email, "password": "brand-new-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
