use anyhow::{Context, anyhow};
use emsu_core::{AppError, PaginationMeta};
use emsu_models::classes::DEFAULT_CAPACITY;
use emsu_models::{
    Class, ClassFilterParams, CreateClassDto, PaginatedClassesResponse, UpdateClassDto,
};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::instrument;

use crate::utils::query::{
    ensure_active, map_write_error, push_active_filter, push_page, push_search,
};

const CLASS_SELECT: &str = "SELECT c.id, c.name, c.grade, c.section, c.teacher_id, \
     t.first_name || ' ' || t.last_name AS teacher_name, c.room_number, c.capacity, \
     c.is_active, c.schedule, c.academic_year \
     FROM classes c \
     LEFT JOIN teachers t ON t.id = c.teacher_id";

pub struct ClassService;

impl ClassService {
    pub async fn find_class<'e, E>(db: E, id: i64) -> Result<Option<Class>, AppError>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Class>(&format!("{CLASS_SELECT} WHERE c.id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch class")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_class(db: &SqlitePool, id: i64) -> Result<Class, AppError> {
        Self::find_class(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Class not found")))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, params: &ClassFilterParams) {
        push_active_filter(qb, "c.is_active", params.include_inactive);
        if let Some(search) = &params.search {
            push_search(qb, &["c.name", "c.section", "c.room_number"], search);
        }
        if let Some(grade) = &params.grade {
            qb.push(" AND c.grade = ").push_bind(grade.clone());
        }
        if let Some(teacher_id) = params.teacher_id {
            qb.push(" AND c.teacher_id = ").push_bind(teacher_id);
        }
        if let Some(academic_year) = &params.academic_year {
            qb.push(" AND c.academic_year = ").push_bind(academic_year.clone());
        }
    }

    #[instrument(skip(db))]
    pub async fn list_classes(
        db: &SqlitePool,
        params: ClassFilterParams,
    ) -> Result<PaginatedClassesResponse, AppError> {
        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM classes c WHERE 1=1");
        Self::push_filters(&mut count_query, &params);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(db)
            .await
            .context("Failed to count classes")
            .map_err(AppError::database)?;

        let mut query = QueryBuilder::<Sqlite>::new(CLASS_SELECT);
        query.push(" WHERE 1=1");
        Self::push_filters(&mut query, &params);
        query.push(" ORDER BY c.grade, c.name, c.section, c.id");
        push_page(&mut query, &params.pagination);

        let classes = query
            .build_query_as::<Class>()
            .fetch_all(db)
            .await
            .context("Failed to fetch classes")
            .map_err(AppError::database)?;

        Ok(PaginatedClassesResponse {
            data: classes,
            meta: PaginationMeta::new(&params.pagination, total),
        })
    }

    #[instrument(skip(db, dto), fields(name = %dto.name))]
    pub async fn create_class(db: &SqlitePool, dto: CreateClassDto) -> Result<Class, AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        if let Some(teacher_id) = dto.teacher_id {
            ensure_active(&mut *tx, "teachers", teacher_id, "Teacher not found").await?;
        }

        let id = sqlx::query(
            "INSERT INTO classes (name, grade, section, teacher_id, room_number, capacity, \
             schedule, academic_year) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(dto.name.trim())
        .bind(dto.grade.trim())
        .bind(dto.section.trim())
        .bind(dto.teacher_id)
        .bind(dto.room_number)
        .bind(dto.capacity.unwrap_or(DEFAULT_CAPACITY))
        .bind(dto.schedule)
        .bind(dto.academic_year)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Class already exists"))?
        .last_insert_rowid();

        let class = Self::find_class(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::internal_error("Created class could not be read back"))?;

        tx.commit().await.context("Failed to commit class")?;

        Ok(class)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_class(
        db: &SqlitePool,
        id: i64,
        dto: UpdateClassDto,
    ) -> Result<Class, AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        let existing = Self::find_class(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Class not found")))?;

        if let Some(Some(teacher_id)) = dto.teacher_id {
            ensure_active(&mut *tx, "teachers", teacher_id, "Teacher not found").await?;
        }

        sqlx::query(
            "UPDATE classes SET name = ?, grade = ?, section = ?, teacher_id = ?, \
             room_number = ?, capacity = ?, schedule = ?, academic_year = ? WHERE id = ?",
        )
        .bind(dto.name.unwrap_or(existing.name))
        .bind(dto.grade.unwrap_or(existing.grade))
        .bind(dto.section.unwrap_or(existing.section))
        .bind(dto.teacher_id.unwrap_or(existing.teacher_id))
        .bind(dto.room_number.unwrap_or(existing.room_number))
        .bind(dto.capacity.unwrap_or(existing.capacity))
        .bind(dto.schedule.unwrap_or(existing.schedule))
        .bind(dto.academic_year.unwrap_or(existing.academic_year))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Class already exists"))?;

        let class = Self::find_class(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Class not found")))?;

        tx.commit().await.context("Failed to commit class")?;

        Ok(class)
    }

    #[instrument(skip(db))]
    pub async fn deactivate_class(db: &SqlitePool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE classes SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to deactivate class")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Class not found")));
        }

        Ok(())
    }
}
