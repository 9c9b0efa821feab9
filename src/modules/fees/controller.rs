use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use emsu_core::{AppError, ErrorResponse};
use emsu_models::{
    CreateFeeDto, FeeFilterParams, FeeResponse, MessageResponse, PaginatedFeesResponse,
    UpdateFeeDto,
};
use tracing::instrument;

use crate::metrics::{track_record_created, track_record_deactivated};
use crate::middleware::role::{FeesRead, FeesWrite, Management};
use crate::modules::fees::service::FeeService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/fees",
    params(FeeFilterParams),
    responses(
        (status = 200, description = "Paginated fees", body = PaginatedFeesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, _user))]
pub async fn get_fees(
    State(state): State<AppState>,
    _user: FeesRead,
    Query(params): Query<FeeFilterParams>,
) -> Result<Json<PaginatedFeesResponse>, AppError> {
    let fees = FeeService::list_fees(&state.db, params).await?;
    Ok(Json(fees))
}

/// Bill a student
///
/// The response carries the computed balance.
#[utoipa::path(
    post,
    path = "/api/fees",
    request_body = CreateFeeDto,
    responses(
        (status = 201, description = "Fee created", body = FeeResponse),
        (status = 400, description = "Student not found", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, _user, dto))]
pub async fn create_fee(
    State(state): State<AppState>,
    _user: FeesWrite,
    ValidatedJson(dto): ValidatedJson<CreateFeeDto>,
) -> Result<(StatusCode, Json<FeeResponse>), AppError> {
    let fee = FeeService::create_fee(&state.db, dto).await?;
    track_record_created("fees");
    Ok((StatusCode::CREATED, Json(fee)))
}

#[utoipa::path(
    get,
    path = "/api/fees/{id}",
    params(("id" = i64, Path, description = "Fee ID")),
    responses(
        (status = 200, description = "Fee details", body = FeeResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Fee not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, _user))]
pub async fn get_fee(
    State(state): State<AppState>,
    _user: FeesRead,
    Path(id): Path<i64>,
) -> Result<Json<FeeResponse>, AppError> {
    let fee = FeeService::get_fee(&state.db, id).await?;
    Ok(Json(fee))
}

#[utoipa::path(
    put,
    path = "/api/fees/{id}",
    params(("id" = i64, Path, description = "Fee ID")),
    request_body = UpdateFeeDto,
    responses(
        (status = 200, description = "Fee updated", body = FeeResponse),
        (status = 400, description = "Student not found", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Fee not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, _user, dto))]
pub async fn update_fee(
    State(state): State<AppState>,
    _user: FeesWrite,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateFeeDto>,
) -> Result<Json<FeeResponse>, AppError> {
    let fee = FeeService::update_fee(&state.db, id, dto).await?;
    Ok(Json(fee))
}

#[utoipa::path(
    delete,
    path = "/api/fees/{id}",
    params(("id" = i64, Path, description = "Fee ID")),
    responses(
        (status = 200, description = "Fee deactivated", body = MessageResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Fee not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, _user))]
pub async fn delete_fee(
    State(state): State<AppState>,
    _user: Management,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    FeeService::deactivate_fee(&state.db, id).await?;
    track_record_deactivated("fees");
    Ok(Json(MessageResponse::new("Fee deleted successfully")))
}
