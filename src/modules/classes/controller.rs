use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use emsu_core::{AppError, ErrorResponse};
use emsu_models::{
    Class, ClassFilterParams, CreateClassDto, MessageResponse, PaginatedClassesResponse,
    UpdateClassDto,
};
use tracing::instrument;

use crate::metrics::{track_record_created, track_record_deactivated};
use crate::middleware::role::{ClassesRead, Management};
use crate::modules::classes::service::ClassService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// List classes with the assigned teacher's name
#[utoipa::path(
    get,
    path = "/api/classes",
    params(ClassFilterParams),
    responses(
        (status = 200, description = "Paginated classes", body = PaginatedClassesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state, _user))]
pub async fn get_classes(
    State(state): State<AppState>,
    _user: ClassesRead,
    Query(params): Query<ClassFilterParams>,
) -> Result<Json<PaginatedClassesResponse>, AppError> {
    let classes = ClassService::list_classes(&state.db, params).await?;
    Ok(Json(classes))
}

#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created", body = Class),
        (status = 400, description = "Teacher not found", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state, _user, dto))]
pub async fn create_class(
    State(state): State<AppState>,
    _user: Management,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<(StatusCode, Json<Class>), AppError> {
    let class = ClassService::create_class(&state.db, dto).await?;
    track_record_created("classes");
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    params(("id" = i64, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class details", body = Class),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state, _user))]
pub async fn get_class(
    State(state): State<AppState>,
    _user: ClassesRead,
    Path(id): Path<i64>,
) -> Result<Json<Class>, AppError> {
    let class = ClassService::get_class(&state.db, id).await?;
    Ok(Json(class))
}

#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    params(("id" = i64, Path, description = "Class ID")),
    request_body = UpdateClassDto,
    responses(
        (status = 200, description = "Class updated", body = Class),
        (status = 400, description = "Teacher not found", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state, _user, dto))]
pub async fn update_class(
    State(state): State<AppState>,
    _user: Management,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateClassDto>,
) -> Result<Json<Class>, AppError> {
    let class = ClassService::update_class(&state.db, id, dto).await?;
    Ok(Json(class))
}

#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(("id" = i64, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class deactivated", body = MessageResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state, _user))]
pub async fn delete_class(
    State(state): State<AppState>,
    _user: Management,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    ClassService::deactivate_class(&state.db, id).await?;
    track_record_deactivated("classes");
    Ok(Json(MessageResponse::new("Class deleted successfully")))
}
