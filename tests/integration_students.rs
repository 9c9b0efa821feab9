mod common;

use axum::http::StatusCode;
use common::{
    count_rows, create_test_user, generate_unique_email, get_auth_token, login_as, send,
    setup_test_app, student_payload,
};
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_as_receptionist(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "receptionist").await;
    let email = generate_unique_email();

    let (status, body) = send(
        &app,
        "POST",
        "/api/students",
        Some(&token),
        Some(student_payload("STU-001", &email)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["student_id"], "STU-001");
    assert_eq!(body["email"], email);
    assert_eq!(body["full_name"], "Amara Okafor");
    assert_eq!(body["is_active"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_student_id_rejected_without_insert(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "admin").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/students",
        Some(&token),
        Some(student_payload("STU-001", &generate_unique_email())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/students",
        Some(&token),
        Some(student_payload("STU-001", &generate_unique_email())),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Student ID already exists");
    assert_eq!(count_rows(&pool, "SELECT COUNT(*) FROM students").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_student_email_rejected_case_insensitively(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "admin").await;

    send(
        &app,
        "POST",
        "/api/students",
        Some(&token),
        Some(student_payload("STU-001", "amara@school.com")),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/students",
        Some(&token),
        Some(student_payload("STU-002", "AMARA@school.com")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");
    assert_eq!(count_rows(&pool, "SELECT COUNT(*) FROM students").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_student_payload_is_unprocessable(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "admin").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/students",
        Some(&token),
        Some(student_payload("STU-001", "not-an-email")),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("email"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_soft_delete_hides_student_but_keeps_history(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "admin").await;

    let (_, student) = send(
        &app,
        "POST",
        "/api/students",
        Some(&token),
        Some(student_payload("STU-001", &generate_unique_email())),
    )
    .await;
    let id = student["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/grades",
        Some(&token),
        Some(json!({
            "student_id": id,
            "subject": "Mathematics",
            "exam_type": "midterm",
            "marks_obtained": 45.0,
            "total_marks": 50.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/students/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Student deleted successfully");

    let (_, list) = send(&app, "GET", "/api/students", Some(&token), None).await;
    assert_eq!(list["meta"]["total"], 0);
    assert!(list["data"].as_array().unwrap().is_empty());

    let (_, list) = send(
        &app,
        "GET",
        "/api/students?include_inactive=true",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(list["meta"]["total"], 1);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/students/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let (status, grades) = send(
        &app,
        "GET",
        &format!("/api/students/{id}/grades"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grades.as_array().unwrap().len(), 1);
    assert_eq!(grades[0]["percentage"], 90.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_partial_update_keeps_omitted_fields(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "principal").await;

    let (_, student) = send(
        &app,
        "POST",
        "/api/students",
        Some(&token),
        Some(student_payload("STU-001", &generate_unique_email())),
    )
    .await;
    let id = student["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/students/{id}"),
        Some(&token),
        Some(json!({ "grade": "Grade 10", "phone": null })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["grade"], "Grade 10");
    assert_eq!(body["phone"], serde_json::Value::Null);
    assert_eq!(body["first_name"], "Amara");
    assert_eq!(body["guardian_name"], "Ngozi Okafor");
    assert_eq!(body["student_id"], "STU-001");
    assert_eq!(body["email"], student["email"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_cannot_delete_student(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let admin_token = login_as(&app, &pool, "admin").await;
    let teacher_token = login_as(&app, &pool, "teacher").await;

    let (_, student) = send(
        &app,
        "POST",
        "/api/students",
        Some(&admin_token),
        Some(student_payload("STU-001", &generate_unique_email())),
    )
    .await;
    let id = student["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/students/{id}"),
        Some(&teacher_token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied");
    assert_eq!(
        count_rows(&pool, "SELECT COUNT(*) FROM students WHERE is_active = 1").await,
        1
    );

    // Teachers may still read.
    let (status, _) = send(&app, "GET", "/api/students", Some(&teacher_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_accountant_cannot_list_students(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let accountant = create_test_user(&pool, "accountant", true).await;
    let token = get_auth_token(&app, &accountant.email).await;

    let (status, _) = send(&app, "GET", "/api/students", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_student_is_not_found(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "admin").await;

    let (status, _) = send(&app, "GET", "/api/students/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/students/999/fees", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_search_matches_name(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "admin").await;

    send(
        &app,
        "POST",
        "/api/students",
        Some(&token),
        Some(student_payload("STU-001", &generate_unique_email())),
    )
    .await;

    let (_, list) = send(&app, "GET", "/api/students?search=okaf", Some(&token), None).await;
    assert_eq!(list["meta"]["total"], 1);

    let (_, list) = send(&app, "GET", "/api/students?search=zzz", Some(&token), None).await;
    assert_eq!(list["meta"]["total"], 0);
}
