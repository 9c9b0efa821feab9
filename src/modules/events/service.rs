use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use emsu_core::{AppError, PaginationMeta};
use emsu_models::{
    CreateEventDto, Event, EventFilterParams, PaginatedEventsResponse, UpdateEventDto,
};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::instrument;

use crate::utils::query::{push_active_filter, push_page, push_search};

const EVENT_SELECT: &str = "SELECT e.id, e.title, e.description, e.event_date, e.end_date, \
     e.location, e.event_type, e.organizer_id, \
     u.first_name || ' ' || u.last_name AS organizer_name, e.is_public, e.max_participants, \
     e.is_active, e.created_at \
     FROM events e \
     LEFT JOIN users u ON u.id = e.organizer_id";

fn check_dates(event_date: DateTime<Utc>, end_date: Option<DateTime<Utc>>) -> Result<(), AppError> {
    match end_date {
        Some(end) if end < event_date => Err(AppError::unprocessable(anyhow!(
            "end_date must not be before event_date"
        ))),
        _ => Ok(()),
    }
}

pub struct EventService;

impl EventService {
    pub async fn find_event<'e, E>(db: E, id: i64) -> Result<Option<Event>, AppError>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Event>(&format!("{EVENT_SELECT} WHERE e.id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch event")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_event(db: &SqlitePool, id: i64) -> Result<Event, AppError> {
        Self::find_event(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Event not found")))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, params: &EventFilterParams) {
        push_active_filter(qb, "e.is_active", params.include_inactive);
        if let Some(search) = &params.search {
            push_search(qb, &["e.title", "e.description", "e.location"], search);
        }
        if let Some(event_type) = params.event_type {
            qb.push(" AND e.event_type = ").push_bind(event_type);
        }
        if let Some(is_public) = params.is_public {
            qb.push(" AND e.is_public = ").push_bind(is_public);
        }
    }

    /// Ordered by start date, earliest first.
    #[instrument(skip(db))]
    pub async fn list_events(
        db: &SqlitePool,
        params: EventFilterParams,
    ) -> Result<PaginatedEventsResponse, AppError> {
        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM events e WHERE 1=1");
        Self::push_filters(&mut count_query, &params);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(db)
            .await
            .context("Failed to count events")
            .map_err(AppError::database)?;

        let mut query = QueryBuilder::<Sqlite>::new(EVENT_SELECT);
        query.push(" WHERE 1=1");
        Self::push_filters(&mut query, &params);
        query.push(" ORDER BY e.event_date, e.id");
        push_page(&mut query, &params.pagination);

        let events = query
            .build_query_as::<Event>()
            .fetch_all(db)
            .await
            .context("Failed to fetch events")
            .map_err(AppError::database)?;

        Ok(PaginatedEventsResponse {
            data: events,
            meta: PaginationMeta::new(&params.pagination, total),
        })
    }

    #[instrument(skip(db, dto))]
    pub async fn create_event(
        db: &SqlitePool,
        dto: CreateEventDto,
        organizer_id: i64,
    ) -> Result<Event, AppError> {
        check_dates(dto.event_date, dto.end_date)?;

        let id = sqlx::query(
            "INSERT INTO events (title, description, event_date, end_date, location, event_type, \
             organizer_id, is_public, max_participants) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(dto.title.trim())
        .bind(dto.description)
        .bind(dto.event_date)
        .bind(dto.end_date)
        .bind(dto.location)
        .bind(dto.event_type)
        .bind(organizer_id)
        .bind(dto.is_public.unwrap_or(true))
        .bind(dto.max_participants)
        .execute(db)
        .await
        .context("Failed to create event")
        .map_err(AppError::database)?
        .last_insert_rowid();

        Self::get_event(db, id).await
    }

    #[instrument(skip(db, dto))]
    pub async fn update_event(
        db: &SqlitePool,
        id: i64,
        dto: UpdateEventDto,
    ) -> Result<Event, AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        let existing = Self::find_event(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Event not found")))?;

        let event_date = dto.event_date.unwrap_or(existing.event_date);
        let end_date = dto.end_date.unwrap_or(existing.end_date);
        check_dates(event_date, end_date)?;

        sqlx::query(
            "UPDATE events SET title = ?, description = ?, event_date = ?, end_date = ?, \
             location = ?, event_type = ?, is_public = ?, max_participants = ? WHERE id = ?",
        )
        .bind(dto.title.unwrap_or(existing.title))
        .bind(dto.description.unwrap_or(existing.description))
        .bind(event_date)
        .bind(end_date)
        .bind(dto.location.unwrap_or(existing.location))
        .bind(dto.event_type.unwrap_or(existing.event_type))
        .bind(dto.is_public.unwrap_or(existing.is_public))
        .bind(dto.max_participants.unwrap_or(existing.max_participants))
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to update event")
        .map_err(AppError::database)?;

        let event = Self::find_event(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Event not found")))?;

        tx.commit().await.context("Failed to commit event")?;

        Ok(event)
    }

    #[instrument(skip(db))]
    pub async fn deactivate_event(db: &SqlitePool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE events SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to deactivate event")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Event not found")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_end_date_before_start_is_rejected() {
        let start = Utc::now();
        let err = check_dates(start, Some(start - Duration::hours(1))).unwrap_err();
        assert_eq!(err.status.as_u16(), 422);
    }

    #[test]
    fn test_open_ended_and_ordered_dates_pass() {
        let start = Utc::now();
        assert!(check_dates(start, None).is_ok());
        assert!(check_dates(start, Some(start)).is_ok());
        assert!(check_dates(start, Some(start + Duration::hours(2))).is_ok());
    }
}
