use axum::{Json, extract::State};
use emsu_core::{AppError, ErrorResponse};
use emsu_models::DashboardStats;
use tracing::instrument;

use crate::middleware::role::DashboardRead;
use crate::modules::dashboard::service::DashboardService;
use crate::state::AppState;

/// School-wide counters
///
/// Active students, teachers, classes and subjects, today's attendance by
/// status, and fee totals.
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Access denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
#[instrument(skip(state, _user))]
pub async fn get_stats(
    State(state): State<AppState>,
    _user: DashboardRead,
) -> Result<Json<DashboardStats>, AppError> {
    let stats = DashboardService::get_stats(&state.db).await?;
    Ok(Json(stats))
}
