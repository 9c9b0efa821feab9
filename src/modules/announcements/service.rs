use anyhow::{Context, anyhow};
use emsu_core::{AppError, PaginationMeta};
use emsu_models::{
    Announcement, AnnouncementFilterParams, CreateAnnouncementDto, PaginatedAnnouncementsResponse,
    UpdateAnnouncementDto,
};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::instrument;

use crate::utils::query::{push_active_filter, push_page, push_search};

const ANNOUNCEMENT_SELECT: &str = "SELECT a.id, a.title, a.content, a.author_id, \
     u.first_name || ' ' || u.last_name AS author_name, a.target_audience, a.priority, \
     a.is_active, a.created_at, a.expires_at, a.attachment_url \
     FROM announcements a \
     LEFT JOIN users u ON u.id = a.author_id";

pub struct AnnouncementService;

impl AnnouncementService {
    pub async fn find_announcement<'e, E>(db: E, id: i64) -> Result<Option<Announcement>, AppError>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Announcement>(&format!("{ANNOUNCEMENT_SELECT} WHERE a.id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch announcement")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_announcement(db: &SqlitePool, id: i64) -> Result<Announcement, AppError> {
        Self::find_announcement(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Announcement not found")))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, params: &AnnouncementFilterParams) {
        push_active_filter(qb, "a.is_active", params.include_inactive);
        if let Some(search) = &params.search {
            push_search(qb, &["a.title", "a.content"], search);
        }
        if let Some(target_audience) = params.target_audience {
            qb.push(" AND a.target_audience = ").push_bind(target_audience);
        }
        if let Some(priority) = params.priority {
            qb.push(" AND a.priority = ").push_bind(priority);
        }
    }

    #[instrument(skip(db))]
    pub async fn list_announcements(
        db: &SqlitePool,
        params: AnnouncementFilterParams,
    ) -> Result<PaginatedAnnouncementsResponse, AppError> {
        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM announcements a WHERE 1=1");
        Self::push_filters(&mut count_query, &params);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(db)
            .await
            .context("Failed to count announcements")
            .map_err(AppError::database)?;

        let mut query = QueryBuilder::<Sqlite>::new(ANNOUNCEMENT_SELECT);
        query.push(" WHERE 1=1");
        Self::push_filters(&mut query, &params);
        query.push(" ORDER BY a.created_at DESC, a.id DESC");
        push_page(&mut query, &params.pagination);

        let announcements = query
            .build_query_as::<Announcement>()
            .fetch_all(db)
            .await
            .context("Failed to fetch announcements")
            .map_err(AppError::database)?;

        Ok(PaginatedAnnouncementsResponse {
            data: announcements,
            meta: PaginationMeta::new(&params.pagination, total),
        })
    }

    #[instrument(skip(db, dto))]
    pub async fn create_announcement(
        db: &SqlitePool,
        dto: CreateAnnouncementDto,
        author_id: i64,
    ) -> Result<Announcement, AppError> {
        let id = sqlx::query(
            "INSERT INTO announcements (title, content, author_id, target_audience, priority, \
             expires_at, attachment_url) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(dto.title.trim())
        .bind(&dto.content)
        .bind(author_id)
        .bind(dto.target_audience)
        .bind(dto.priority.unwrap_or_default())
        .bind(dto.expires_at)
        .bind(dto.attachment_url)
        .execute(db)
        .await
        .context("Failed to create announcement")
        .map_err(AppError::database)?
        .last_insert_rowid();

        Self::get_announcement(db, id).await
    }

    #[instrument(skip(db, dto))]
    pub async fn update_announcement(
        db: &SqlitePool,
        id: i64,
        dto: UpdateAnnouncementDto,
    ) -> Result<Announcement, AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        let existing = Self::find_announcement(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Announcement not found")))?;

        sqlx::query(
            "UPDATE announcements SET title = ?, content = ?, target_audience = ?, priority = ?, \
             expires_at = ?, attachment_url = ? WHERE id = ?",
        )
        .bind(dto.title.unwrap_or(existing.title))
        .bind(dto.content.unwrap_or(existing.content))
        .bind(dto.target_audience.unwrap_or(existing.target_audience))
        .bind(dto.priority.unwrap_or(existing.priority))
        .bind(dto.expires_at.unwrap_or(existing.expires_at))
        .bind(dto.attachment_url.unwrap_or(existing.attachment_url))
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to update announcement")
        .map_err(AppError::database)?;

        let announcement = Self::find_announcement(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Announcement not found")))?;

        tx.commit().await.context("Failed to commit announcement")?;

        Ok(announcement)
    }

    #[instrument(skip(db))]
    pub async fn deactivate_announcement(db: &SqlitePool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE announcements SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to deactivate announcement")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Announcement not found")));
        }

        Ok(())
    }
}
