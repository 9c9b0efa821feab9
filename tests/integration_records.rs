mod common;

use axum::Router;
use axum::http::StatusCode;
use chrono::Utc;
use common::{count_rows, generate_unique_email, login_as, send, setup_test_app, student_payload};
use serde_json::json;
use sqlx::SqlitePool;

async fn create_student(app: &Router, token: &str, student_id: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/students",
        Some(token),
        Some(student_payload(student_id, &generate_unique_email())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

async fn create_teacher(app: &Router, token: &str, teacher_id: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/teachers",
        Some(token),
        Some(json!({
            "teacher_id": teacher_id,
            "first_name": "Kwame",
            "last_name": "Mensah",
            "email": generate_unique_email(),
            "subject": "Mathematics"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_grade_percentage_is_rounded(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "teacher").await;
    let admin = login_as(&app, &pool, "admin").await;
    let student = create_student(&app, &admin, "STU-001").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/grades",
        Some(&token),
        Some(json!({
            "student_id": student,
            "subject": "Physics",
            "exam_type": "quiz",
            "marks_obtained": 2.0,
            "total_marks": 3.0
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["percentage"], 66.67);
    assert_eq!(body["weight"], 1.0);
    assert_eq!(body["student_name"], "Amara Okafor");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_grade_with_zero_total_marks_is_rejected(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "admin").await;
    let student = create_student(&app, &token, "STU-001").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/grades",
        Some(&token),
        Some(json!({
            "student_id": student,
            "subject": "Physics",
            "exam_type": "quiz",
            "marks_obtained": 0.0,
            "total_marks": 0.0
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("total_marks"));
    assert_eq!(count_rows(&pool, "SELECT COUNT(*) FROM grades").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_grade_for_unknown_student_is_bad_request(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "admin").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/grades",
        Some(&token),
        Some(json!({
            "student_id": 404,
            "subject": "Physics",
            "exam_type": "quiz",
            "marks_obtained": 1.0,
            "total_marks": 2.0
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_with_active_classes_cannot_be_deactivated(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "principal").await;
    let teacher = create_teacher(&app, &token, "TCH-001").await;

    let (status, class) = send(
        &app,
        "POST",
        "/api/classes",
        Some(&token),
        Some(json!({
            "name": "Grade 9A",
            "grade": "Grade 9",
            "section": "A",
            "teacher_id": teacher
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(class["capacity"], 30);
    assert_eq!(class["teacher_name"], "Kwame Mensah");

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/teachers/{teacher}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("1 active class"));

    let class_id = class["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/classes/{class_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/teachers/{teacher}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_class_cannot_be_assigned_to_deactivated_teacher(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "principal").await;
    let former = create_teacher(&app, &token, "TCH-001").await;
    let current = create_teacher(&app, &token, "TCH-002").await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/teachers/{former}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let class = |teacher_id: i64| {
        json!({
            "name": "Grade 10B",
            "grade": "Grade 10",
            "section": "B",
            "teacher_id": teacher_id
        })
    };

    let (status, body) =
        send(&app, "POST", "/api/classes", Some(&token), Some(class(former))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Teacher not found");
    assert_eq!(count_rows(&pool, "SELECT COUNT(*) FROM classes").await, 0);

    let (status, body) =
        send(&app, "POST", "/api/classes", Some(&token), Some(class(current))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let class_id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/classes/{class_id}"),
        Some(&token),
        Some(json!({ "teacher_id": former })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Teacher not found");

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/classes/{class_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["teacher_id"], current);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_fee_balance_and_access(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let admin = login_as(&app, &pool, "admin").await;
    let accountant = login_as(&app, &pool, "accountant").await;
    let teacher = login_as(&app, &pool, "teacher").await;
    let student = create_student(&app, &admin, "STU-001").await;

    let fee = json!({
        "student_id": student,
        "fee_type": "tuition",
        "amount": 1000.0,
        "due_date": "2030-01-31",
        "paid_amount": 400.0,
        "status": "Partial"
    });

    let (status, _) = send(&app, "POST", "/api/fees", Some(&teacher), Some(fee.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "POST", "/api/fees", Some(&accountant), Some(fee)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["balance"], 600.0);
    assert_eq!(body["status"], "Partial");

    let (status, fees) = send(
        &app,
        "GET",
        &format!("/api/students/{student}/fees"),
        Some(&accountant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fees.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_attendance_is_stamped_with_marker(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let admin = login_as(&app, &pool, "admin").await;
    let teacher_token = login_as(&app, &pool, "teacher").await;
    let student = create_student(&app, &admin, "STU-001").await;

    let (_, class) = send(
        &app,
        "POST",
        "/api/classes",
        Some(&admin),
        Some(json!({ "name": "Grade 9A", "grade": "Grade 9", "section": "A" })),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/attendance",
        Some(&teacher_token),
        Some(json!({
            "student_id": student,
            "class_id": class["id"],
            "date": Utc::now().date_naive(),
            "status": "late",
            "time_in": "08:15:00"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["status"], "late");
    assert!(body["marked_by"].as_i64().is_some());

    let (_, stats) = send(&app, "GET", "/api/dashboard/stats", Some(&admin), None).await;
    assert_eq!(stats["attendance_today"]["late"], 1);
    assert_eq!(stats["attendance_today"]["total"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_dashboard_counts_active_records(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let admin = login_as(&app, &pool, "admin").await;

    let first = create_student(&app, &admin, "STU-001").await;
    create_student(&app, &admin, "STU-002").await;
    send(&app, "DELETE", &format!("/api/students/{first}"), Some(&admin), None).await;

    send(
        &app,
        "POST",
        "/api/fees",
        Some(&admin),
        Some(json!({
            "student_id": first,
            "fee_type": "library",
            "amount": 50.0,
            "due_date": "2030-01-31"
        })),
    )
    .await;

    let (status, stats) = send(&app, "GET", "/api/dashboard/stats", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["students"], 1);
    assert_eq!(stats["teachers"], 0);
    assert_eq!(stats["fees"]["total_billed"], 50.0);
    assert_eq!(stats["fees"]["outstanding"], 50.0);
    assert_eq!(stats["fees"]["pending_count"], 1);

    let receptionist = login_as(&app, &pool, "receptionist").await;
    let (status, _) = send(&app, "GET", "/api/dashboard/stats", Some(&receptionist), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_event_end_before_start_is_rejected(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "principal").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/events",
        Some(&token),
        Some(json!({
            "title": "Sports day",
            "event_date": "2030-05-02T09:00:00Z",
            "end_date": "2030-05-01T09:00:00Z",
            "event_type": "sports"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(count_rows(&pool, "SELECT COUNT(*) FROM events").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_announcements_readable_by_every_role(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let principal = login_as(&app, &pool, "principal").await;
    let accountant = login_as(&app, &pool, "accountant").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/announcements",
        Some(&principal),
        Some(json!({
            "title": "Term starts",
            "content": "Classes resume on Monday.",
            "target_audience": "all"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["priority"], "normal");
    assert!(body["author_id"].as_i64().is_some());

    let (status, list) = send(&app, "GET", "/api/announcements", Some(&accountant), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["meta"]["total"], 1);

    let (status, _) = send(
        &app,
        "POST",
        "/api/announcements",
        Some(&accountant),
        Some(json!({ "title": "x", "content": "y", "target_audience": "staff" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_subject_code_rejected(pool: SqlitePool) {
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, "admin").await;
    let subject = json!({ "name": "Mathematics", "code": "MTH101" });

    let (status, body) = send(
        &app,
        "POST",
        "/api/subjects",
        Some(&token),
        Some(subject.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["credits"], 1);

    let (status, body) = send(&app, "POST", "/api/subjects", Some(&token), Some(subject)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Subject code already exists");
}
