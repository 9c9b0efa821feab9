use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use emsu_core::{AppError, ErrorResponse};
use emsu_models::{
    Announcement, AnnouncementFilterParams, CreateAnnouncementDto, MessageResponse,
    PaginatedAnnouncementsResponse, UpdateAnnouncementDto,
};
use tracing::instrument;

use crate::metrics::{track_record_created, track_record_deactivated};
use crate::middleware::role::{ActiveUser, Management};
use crate::modules::announcements::service::AnnouncementService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/announcements",
    params(AnnouncementFilterParams),
    responses(
        (status = 200, description = "Paginated announcements", body = PaginatedAnnouncementsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Announcements"
)]
#[instrument(skip(state, _user))]
pub async fn get_announcements(
    State(state): State<AppState>,
    _user: ActiveUser,
    Query(params): Query<AnnouncementFilterParams>,
) -> Result<Json<PaginatedAnnouncementsResponse>, AppError> {
    let announcements = AnnouncementService::list_announcements(&state.db, params).await?;
    Ok(Json(announcements))
}

/// Publish an announcement
///
/// The caller becomes the author.
#[utoipa::path(
    post,
    path = "/api/announcements",
    request_body = CreateAnnouncementDto,
    responses(
        (status = 201, description = "Announcement created", body = Announcement),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Announcements"
)]
#[instrument(skip(state, user, dto), fields(user.id = user.id))]
pub async fn create_announcement(
    State(state): State<AppState>,
    Management(user): Management,
    ValidatedJson(dto): ValidatedJson<CreateAnnouncementDto>,
) -> Result<(StatusCode, Json<Announcement>), AppError> {
    let announcement = AnnouncementService::create_announcement(&state.db, dto, user.id).await?;
    track_record_created("announcements");
    Ok((StatusCode::CREATED, Json(announcement)))
}

#[utoipa::path(
    get,
    path = "/api/announcements/{id}",
    params(("id" = i64, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement details", body = Announcement),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Announcement not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Announcements"
)]
#[instrument(skip(state, _user))]
pub async fn get_announcement(
    State(state): State<AppState>,
    _user: ActiveUser,
    Path(id): Path<i64>,
) -> Result<Json<Announcement>, AppError> {
    let announcement = AnnouncementService::get_announcement(&state.db, id).await?;
    Ok(Json(announcement))
}

#[utoipa::path(
    put,
    path = "/api/announcements/{id}",
    params(("id" = i64, Path, description = "Announcement ID")),
    request_body = UpdateAnnouncementDto,
    responses(
        (status = 200, description = "Announcement updated", body = Announcement),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Announcement not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Announcements"
)]
#[instrument(skip(state, _user, dto))]
pub async fn update_announcement(
    State(state): State<AppState>,
    _user: Management,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateAnnouncementDto>,
) -> Result<Json<Announcement>, AppError> {
    let announcement = AnnouncementService::update_announcement(&state.db, id, dto).await?;
    Ok(Json(announcement))
}

#[utoipa::path(
    delete,
    path = "/api/announcements/{id}",
    params(("id" = i64, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement deactivated", body = MessageResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Announcement not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Announcements"
)]
#[instrument(skip(state, _user))]
pub async fn delete_announcement(
    State(state): State<AppState>,
    _user: Management,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    AnnouncementService::deactivate_announcement(&state.db, id).await?;
    track_record_deactivated("announcements");
    Ok(Json(MessageResponse::new("Announcement deleted successfully")))
}
