use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use emsu_core::{AppError, ErrorResponse};
use emsu_models::{
    CreateEventDto, Event, EventFilterParams, MessageResponse, PaginatedEventsResponse,
    UpdateEventDto,
};
use tracing::instrument;

use crate::metrics::{track_record_created, track_record_deactivated};
use crate::middleware::role::{ActiveUser, Management};
use crate::modules::events::service::EventService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// List school events, earliest first
#[utoipa::path(
    get,
    path = "/api/events",
    params(EventFilterParams),
    responses(
        (status = 200, description = "Paginated events", body = PaginatedEventsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
#[instrument(skip(state, _user))]
pub async fn get_events(
    State(state): State<AppState>,
    _user: ActiveUser,
    Query(params): Query<EventFilterParams>,
) -> Result<Json<PaginatedEventsResponse>, AppError> {
    let events = EventService::list_events(&state.db, params).await?;
    Ok(Json(events))
}

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventDto,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
#[instrument(skip(state, user, dto), fields(user.id = user.id))]
pub async fn create_event(
    State(state): State<AppState>,
    Management(user): Management,
    ValidatedJson(dto): ValidatedJson<CreateEventDto>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = EventService::create_event(&state.db, dto, user.id).await?;
    track_record_created("events");
    Ok((StatusCode::CREATED, Json(event)))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = i64, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event details", body = Event),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
#[instrument(skip(state, _user))]
pub async fn get_event(
    State(state): State<AppState>,
    _user: ActiveUser,
    Path(id): Path<i64>,
) -> Result<Json<Event>, AppError> {
    let event = EventService::get_event(&state.db, id).await?;
    Ok(Json(event))
}

/// Partially update an event
///
/// `end_date` may not precede `event_date` (422).
#[utoipa::path(
    put,
    path = "/api/events/{id}",
    params(("id" = i64, Path, description = "Event ID")),
    request_body = UpdateEventDto,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
#[instrument(skip(state, _user, dto))]
pub async fn update_event(
    State(state): State<AppState>,
    _user: Management,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateEventDto>,
) -> Result<Json<Event>, AppError> {
    let event = EventService::update_event(&state.db, id, dto).await?;
    Ok(Json(event))
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(("id" = i64, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deactivated", body = MessageResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
#[instrument(skip(state, _user))]
pub async fn delete_event(
    State(state): State<AppState>,
    _user: Management,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    EventService::deactivate_event(&state.db, id).await?;
    track_record_deactivated("events");
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}
