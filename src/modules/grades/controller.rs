use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use emsu_core::{AppError, ErrorResponse};
use emsu_models::{
    CreateGradeDto, GradeFilterParams, GradeResponse, MessageResponse, PaginatedGradesResponse,
    UpdateGradeDto,
};
use tracing::instrument;

use crate::metrics::{track_record_created, track_record_deactivated};
use crate::middleware::role::{AcademicStaff, Management};
use crate::modules::grades::service::GradeService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/grades",
    params(GradeFilterParams),
    responses(
        (status = 200, description = "Paginated grades", body = PaginatedGradesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Grades"
)]
#[instrument(skip(state, _user))]
pub async fn get_grades(
    State(state): State<AppState>,
    _user: AcademicStaff,
    Query(params): Query<GradeFilterParams>,
) -> Result<Json<PaginatedGradesResponse>, AppError> {
    let grades = GradeService::list_grades(&state.db, params).await?;
    Ok(Json(grades))
}

/// Record a grade
///
/// `total_marks` must be positive; the response carries the computed
/// percentage.
#[utoipa::path(
    post,
    path = "/api/grades",
    request_body = CreateGradeDto,
    responses(
        (status = 201, description = "Grade recorded", body = GradeResponse),
        (status = 400, description = "Student or teacher not found", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Grades"
)]
#[instrument(skip(state, _user, dto))]
pub async fn create_grade(
    State(state): State<AppState>,
    _user: AcademicStaff,
    ValidatedJson(dto): ValidatedJson<CreateGradeDto>,
) -> Result<(StatusCode, Json<GradeResponse>), AppError> {
    let grade = GradeService::create_grade(&state.db, dto).await?;
    track_record_created("grades");
    Ok((StatusCode::CREATED, Json(grade)))
}

#[utoipa::path(
    get,
    path = "/api/grades/{id}",
    params(("id" = i64, Path, description = "Grade ID")),
    responses(
        (status = 200, description = "Grade details", body = GradeResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Grade not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Grades"
)]
#[instrument(skip(state, _user))]
pub async fn get_grade(
    State(state): State<AppState>,
    _user: AcademicStaff,
    Path(id): Path<i64>,
) -> Result<Json<GradeResponse>, AppError> {
    let grade = GradeService::get_grade(&state.db, id).await?;
    Ok(Json(grade))
}

#[utoipa::path(
    put,
    path = "/api/grades/{id}",
    params(("id" = i64, Path, description = "Grade ID")),
    request_body = UpdateGradeDto,
    responses(
        (status = 200, description = "Grade updated", body = GradeResponse),
        (status = 400, description = "Student or teacher not found", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Grade not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Grades"
)]
#[instrument(skip(state, _user, dto))]
pub async fn update_grade(
    State(state): State<AppState>,
    _user: AcademicStaff,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateGradeDto>,
) -> Result<Json<GradeResponse>, AppError> {
    let grade = GradeService::update_grade(&state.db, id, dto).await?;
    Ok(Json(grade))
}

#[utoipa::path(
    delete,
    path = "/api/grades/{id}",
    params(("id" = i64, Path, description = "Grade ID")),
    responses(
        (status = 200, description = "Grade deactivated", body = MessageResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Grade not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Grades"
)]
#[instrument(skip(state, _user))]
pub async fn delete_grade(
    State(state): State<AppState>,
    _user: Management,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    GradeService::deactivate_grade(&state.db, id).await?;
    track_record_deactivated("grades");
    Ok(Json(MessageResponse::new("Grade deleted successfully")))
}
