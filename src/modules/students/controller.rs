use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use emsu_core::{AppError, ErrorResponse};
use emsu_models::{
    Attendance, CreateStudentDto, FeeResponse, GradeResponse, MessageResponse,
    PaginatedStudentsResponse, Student, StudentFilterParams, UpdateStudentDto,
};
use tracing::instrument;

use crate::metrics::{track_record_created, track_record_deactivated};
use crate::middleware::role::{AcademicStaff, FeesRead, Management, StudentsRead, StudentsWrite};
use crate::modules::attendance::service::AttendanceService;
use crate::modules::fees::service::FeeService;
use crate::modules::grades::service::GradeService;
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// List students
///
/// Inactive students are left out unless `include_inactive=true`.
#[utoipa::path(
    get,
    path = "/api/students",
    params(StudentFilterParams),
    responses(
        (status = 200, description = "Paginated students", body = PaginatedStudentsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, _user))]
pub async fn get_students(
    State(state): State<AppState>,
    _user: StudentsRead,
    Query(params): Query<StudentFilterParams>,
) -> Result<Json<PaginatedStudentsResponse>, AppError> {
    let students = StudentService::list_students(&state.db, params).await?;
    Ok(Json(students))
}

/// Enroll a student
#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 400, description = "Student ID or email already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, _user, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    _user: StudentsWrite,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let student = StudentService::create_student(&state.db, dto).await?;
    track_record_created("students");
    Ok((StatusCode::CREATED, Json(student)))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student details", body = Student),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, _user))]
pub async fn get_student(
    State(state): State<AppState>,
    _user: StudentsRead,
    Path(id): Path<i64>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::get_student(&state.db, id).await?;
    Ok(Json(student))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 400, description = "Student ID or email already exists", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, _user, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    _user: StudentsWrite,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::update_student(&state.db, id, dto).await?;
    Ok(Json(student))
}

/// Deactivate a student
///
/// The row and the student's grades, fees and attendance remain readable.
#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student deactivated", body = MessageResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, _user))]
pub async fn delete_student(
    State(state): State<AppState>,
    _user: Management,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    StudentService::deactivate_student(&state.db, id).await?;
    track_record_deactivated("students");
    Ok(Json(MessageResponse::new("Student deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}/grades",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "The student's grades", body = Vec<GradeResponse>),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, _user))]
pub async fn get_student_grades(
    State(state): State<AppState>,
    _user: AcademicStaff,
    Path(id): Path<i64>,
) -> Result<Json<Vec<GradeResponse>>, AppError> {
    StudentService::get_student(&state.db, id).await?;
    let grades = GradeService::list_for_student(&state.db, id).await?;
    Ok(Json(grades))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}/fees",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "The student's fees", body = Vec<FeeResponse>),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, _user))]
pub async fn get_student_fees(
    State(state): State<AppState>,
    _user: FeesRead,
    Path(id): Path<i64>,
) -> Result<Json<Vec<FeeResponse>>, AppError> {
    StudentService::get_student(&state.db, id).await?;
    let fees = FeeService::list_for_student(&state.db, id).await?;
    Ok(Json(fees))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}/attendance",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "The student's attendance", body = Vec<Attendance>),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, _user))]
pub async fn get_student_attendance(
    State(state): State<AppState>,
    _user: AcademicStaff,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Attendance>>, AppError> {
    StudentService::get_student(&state.db, id).await?;
    let records = AttendanceService::list_for_student(&state.db, id).await?;
    Ok(Json(records))
}
