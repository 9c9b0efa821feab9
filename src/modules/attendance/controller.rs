use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use emsu_core::{AppError, ErrorResponse};
use emsu_models::{
    Attendance, AttendanceFilterParams, CreateAttendanceDto, MessageResponse,
    PaginatedAttendanceResponse, UpdateAttendanceDto,
};
use tracing::instrument;

use crate::metrics::{track_record_created, track_record_deactivated};
use crate::middleware::role::{AcademicStaff, Management};
use crate::modules::attendance::service::AttendanceService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceFilterParams),
    responses(
        (status = 200, description = "Paginated attendance records", body = PaginatedAttendanceResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, _user))]
pub async fn get_attendance_records(
    State(state): State<AppState>,
    _user: AcademicStaff,
    Query(params): Query<AttendanceFilterParams>,
) -> Result<Json<PaginatedAttendanceResponse>, AppError> {
    let records = AttendanceService::list_attendance(&state.db, params).await?;
    Ok(Json(records))
}

/// Mark attendance
///
/// The caller is recorded as `marked_by`.
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = CreateAttendanceDto,
    responses(
        (status = 201, description = "Attendance recorded", body = Attendance),
        (status = 400, description = "Student or class not found", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, user, dto), fields(marked_by = user.id))]
pub async fn create_attendance(
    State(state): State<AppState>,
    AcademicStaff(user): AcademicStaff,
    ValidatedJson(dto): ValidatedJson<CreateAttendanceDto>,
) -> Result<(StatusCode, Json<Attendance>), AppError> {
    let record = AttendanceService::create_attendance(&state.db, dto, user.id).await?;
    track_record_created("attendance");
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/attendance/{id}",
    params(("id" = i64, Path, description = "Attendance record ID")),
    responses(
        (status = 200, description = "Attendance record", body = Attendance),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Attendance record not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, _user))]
pub async fn get_attendance(
    State(state): State<AppState>,
    _user: AcademicStaff,
    Path(id): Path<i64>,
) -> Result<Json<Attendance>, AppError> {
    let record = AttendanceService::get_attendance(&state.db, id).await?;
    Ok(Json(record))
}

#[utoipa::path(
    put,
    path = "/api/attendance/{id}",
    params(("id" = i64, Path, description = "Attendance record ID")),
    request_body = UpdateAttendanceDto,
    responses(
        (status = 200, description = "Attendance record updated", body = Attendance),
        (status = 400, description = "Student or class not found", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Attendance record not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, _user, dto))]
pub async fn update_attendance(
    State(state): State<AppState>,
    _user: AcademicStaff,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateAttendanceDto>,
) -> Result<Json<Attendance>, AppError> {
    let record = AttendanceService::update_attendance(&state.db, id, dto).await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(("id" = i64, Path, description = "Attendance record ID")),
    responses(
        (status = 200, description = "Attendance record deactivated", body = MessageResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Attendance record not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, _user))]
pub async fn delete_attendance(
    State(state): State<AppState>,
    _user: Management,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    AttendanceService::deactivate_attendance(&state.db, id).await?;
    track_record_deactivated("attendance");
    Ok(Json(MessageResponse::new(
        "Attendance record deleted successfully",
    )))
}
