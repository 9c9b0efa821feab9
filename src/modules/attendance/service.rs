use anyhow::{Context, anyhow};
use emsu_core::{AppError, PaginationMeta};
use emsu_models::{
    Attendance, AttendanceFilterParams, CreateAttendanceDto, PaginatedAttendanceResponse,
    UpdateAttendanceDto,
};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::instrument;

use crate::utils::query::{
    ensure_exists, map_write_error, push_active_filter, push_page, push_search,
};

const ATTENDANCE_FROM: &str = " FROM attendance a \
     LEFT JOIN students s ON s.id = a.student_id \
     LEFT JOIN classes c ON c.id = a.class_id";

const ATTENDANCE_COLUMNS: &str = "SELECT a.id, a.student_id, \
     s.first_name || ' ' || s.last_name AS student_name, a.class_id, c.name AS class_name, \
     a.date, a.status, a.marked_by, a.notes, a.time_in, a.time_out, a.is_active, a.created_at";

const ATTENDANCE_ORDER: &str = " ORDER BY a.date DESC, a.id DESC";

pub struct AttendanceService;

impl AttendanceService {
    pub async fn find_attendance<'e, E>(db: E, id: i64) -> Result<Option<Attendance>, AppError>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Attendance>(&format!(
            "{ATTENDANCE_COLUMNS}{ATTENDANCE_FROM} WHERE a.id = ?"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch attendance record")
        .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_attendance(db: &SqlitePool, id: i64) -> Result<Attendance, AppError> {
        Self::find_attendance(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Attendance record not found")))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, params: &AttendanceFilterParams) {
        push_active_filter(qb, "a.is_active", params.include_inactive);
        if let Some(search) = &params.search {
            push_search(qb, &["s.first_name", "s.last_name", "a.notes"], search);
        }
        if let Some(student_id) = params.student_id {
            qb.push(" AND a.student_id = ").push_bind(student_id);
        }
        if let Some(class_id) = params.class_id {
            qb.push(" AND a.class_id = ").push_bind(class_id);
        }
        if let Some(date) = params.date {
            qb.push(" AND a.date = ").push_bind(date);
        }
        if let Some(date_from) = params.date_from {
            qb.push(" AND a.date >= ").push_bind(date_from);
        }
        if let Some(date_to) = params.date_to {
            qb.push(" AND a.date <= ").push_bind(date_to);
        }
        if let Some(status) = params.status {
            qb.push(" AND a.status = ").push_bind(status);
        }
    }

    #[instrument(skip(db))]
    pub async fn list_attendance(
        db: &SqlitePool,
        params: AttendanceFilterParams,
    ) -> Result<PaginatedAttendanceResponse, AppError> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*)");
        count_query.push(ATTENDANCE_FROM).push(" WHERE 1=1");
        Self::push_filters(&mut count_query, &params);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(db)
            .await
            .context("Failed to count attendance records")
            .map_err(AppError::database)?;

        let mut query = QueryBuilder::<Sqlite>::new(ATTENDANCE_COLUMNS);
        query.push(ATTENDANCE_FROM).push(" WHERE 1=1");
        Self::push_filters(&mut query, &params);
        query.push(ATTENDANCE_ORDER);
        push_page(&mut query, &params.pagination);

        let records = query
            .build_query_as::<Attendance>()
            .fetch_all(db)
            .await
            .context("Failed to fetch attendance records")
            .map_err(AppError::database)?;

        Ok(PaginatedAttendanceResponse {
            data: records,
            meta: PaginationMeta::new(&params.pagination, total),
        })
    }

    /// Active attendance of one student, whether or not the student is active.
    #[instrument(skip(db))]
    pub async fn list_for_student(
        db: &SqlitePool,
        student_id: i64,
    ) -> Result<Vec<Attendance>, AppError> {
        sqlx::query_as::<_, Attendance>(&format!(
            "{ATTENDANCE_COLUMNS}{ATTENDANCE_FROM} \
             WHERE a.student_id = ? AND a.is_active = 1{ATTENDANCE_ORDER}"
        ))
        .bind(student_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch student attendance")
        .map_err(AppError::database)
    }

    /// Records attendance as marked by `marked_by`. A second record for the
    /// same student, class and date is accepted.
    #[instrument(skip(db, dto), fields(student_id = dto.student_id, class_id = dto.class_id))]
    pub async fn create_attendance(
        db: &SqlitePool,
        dto: CreateAttendanceDto,
        marked_by: i64,
    ) -> Result<Attendance, AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        ensure_exists(&mut *tx, "students", dto.student_id, "Student not found").await?;
        ensure_exists(&mut *tx, "classes", dto.class_id, "Class not found").await?;

        let id = sqlx::query(
            "INSERT INTO attendance (student_id, class_id, date, status, marked_by, notes, \
             time_in, time_out) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(dto.student_id)
        .bind(dto.class_id)
        .bind(dto.date)
        .bind(dto.status)
        .bind(marked_by)
        .bind(dto.notes)
        .bind(dto.time_in)
        .bind(dto.time_out)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Attendance record already exists"))?
        .last_insert_rowid();

        let record = Self::find_attendance(&mut *tx, id).await?.ok_or_else(|| {
            AppError::internal_error("Created attendance record could not be read back")
        })?;

        tx.commit().await.context("Failed to commit attendance")?;

        Ok(record)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_attendance(
        db: &SqlitePool,
        id: i64,
        dto: UpdateAttendanceDto,
    ) -> Result<Attendance, AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        let existing = Self::find_attendance(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Attendance record not found")))?;

        if let Some(student_id) = dto.student_id {
            ensure_exists(&mut *tx, "students", student_id, "Student not found").await?;
        }
        if let Some(class_id) = dto.class_id {
            ensure_exists(&mut *tx, "classes", class_id, "Class not found").await?;
        }

        sqlx::query(
            "UPDATE attendance SET student_id = ?, class_id = ?, date = ?, status = ?, \
             notes = ?, time_in = ?, time_out = ? WHERE id = ?",
        )
        .bind(dto.student_id.unwrap_or(existing.student_id))
        .bind(dto.class_id.unwrap_or(existing.class_id))
        .bind(dto.date.unwrap_or(existing.date))
        .bind(dto.status.unwrap_or(existing.status))
        .bind(dto.notes.unwrap_or(existing.notes))
        .bind(dto.time_in.unwrap_or(existing.time_in))
        .bind(dto.time_out.unwrap_or(existing.time_out))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Attendance record already exists"))?;

        let record = Self::find_attendance(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Attendance record not found")))?;

        tx.commit().await.context("Failed to commit attendance")?;

        Ok(record)
    }

    #[instrument(skip(db))]
    pub async fn deactivate_attendance(db: &SqlitePool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE attendance SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to deactivate attendance record")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Attendance record not found")));
        }

        Ok(())
    }
}
