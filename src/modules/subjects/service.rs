use anyhow::{Context, anyhow};
use emsu_core::{AppError, PaginationMeta};
use emsu_models::{
    CreateSubjectDto, PaginatedSubjectsResponse, Subject, SubjectFilterParams, UpdateSubjectDto,
};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::instrument;

use crate::utils::query::{
    map_write_error, push_active_filter, push_page, push_search, value_taken,
};

const SUBJECT_SELECT: &str = "SELECT id, name, code, description, credits, grade_level, \
     department, is_mandatory, is_active FROM subjects";

const CODE_TAKEN: &str = "Subject code already exists";

pub struct SubjectService;

impl SubjectService {
    pub async fn find_subject<'e, E>(db: E, id: i64) -> Result<Option<Subject>, AppError>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Subject>(&format!("{SUBJECT_SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch subject")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_subject(db: &SqlitePool, id: i64) -> Result<Subject, AppError> {
        Self::find_subject(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Subject not found")))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, params: &SubjectFilterParams) {
        push_active_filter(qb, "is_active", params.include_inactive);
        if let Some(search) = &params.search {
            push_search(qb, &["name", "code", "department"], search);
        }
        if let Some(grade_level) = &params.grade_level {
            qb.push(" AND grade_level = ").push_bind(grade_level.clone());
        }
        if let Some(department) = &params.department {
            qb.push(" AND department = ").push_bind(department.clone());
        }
    }

    #[instrument(skip(db))]
    pub async fn list_subjects(
        db: &SqlitePool,
        params: SubjectFilterParams,
    ) -> Result<PaginatedSubjectsResponse, AppError> {
        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM subjects WHERE 1=1");
        Self::push_filters(&mut count_query, &params);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(db)
            .await
            .context("Failed to count subjects")
            .map_err(AppError::database)?;

        let mut query = QueryBuilder::<Sqlite>::new(SUBJECT_SELECT);
        query.push(" WHERE 1=1");
        Self::push_filters(&mut query, &params);
        query.push(" ORDER BY name, id");
        push_page(&mut query, &params.pagination);

        let subjects = query
            .build_query_as::<Subject>()
            .fetch_all(db)
            .await
            .context("Failed to fetch subjects")
            .map_err(AppError::database)?;

        Ok(PaginatedSubjectsResponse {
            data: subjects,
            meta: PaginationMeta::new(&params.pagination, total),
        })
    }

    #[instrument(skip(db, dto), fields(code = %dto.code))]
    pub async fn create_subject(
        db: &SqlitePool,
        dto: CreateSubjectDto,
    ) -> Result<Subject, AppError> {
        let code = dto.code.trim().to_string();

        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        if value_taken(&mut *tx, "subjects", "code", &code, None).await? {
            return Err(AppError::bad_request(anyhow!(CODE_TAKEN)));
        }

        let id = sqlx::query(
            "INSERT INTO subjects (name, code, description, credits, grade_level, department, \
             is_mandatory) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(dto.name.trim())
        .bind(&code)
        .bind(dto.description)
        .bind(dto.credits.unwrap_or(1))
        .bind(dto.grade_level)
        .bind(dto.department)
        .bind(dto.is_mandatory.unwrap_or(true))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, CODE_TAKEN))?
        .last_insert_rowid();

        let subject = Self::find_subject(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::internal_error("Created subject could not be read back"))?;

        tx.commit().await.context("Failed to commit subject")?;

        Ok(subject)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_subject(
        db: &SqlitePool,
        id: i64,
        dto: UpdateSubjectDto,
    ) -> Result<Subject, AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        let existing = Self::find_subject(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Subject not found")))?;

        let code = match dto.code {
            Some(code) => {
                let code = code.trim().to_string();
                if value_taken(&mut *tx, "subjects", "code", &code, Some(id)).await? {
                    return Err(AppError::bad_request(anyhow!(CODE_TAKEN)));
                }
                code
            }
            None => existing.code,
        };

        sqlx::query(
            "UPDATE subjects SET name = ?, code = ?, description = ?, credits = ?, \
             grade_level = ?, department = ?, is_mandatory = ? WHERE id = ?",
        )
        .bind(dto.name.unwrap_or(existing.name))
        .bind(&code)
        .bind(dto.description.unwrap_or(existing.description))
        .bind(dto.credits.unwrap_or(existing.credits))
        .bind(dto.grade_level.unwrap_or(existing.grade_level))
        .bind(dto.department.unwrap_or(existing.department))
        .bind(dto.is_mandatory.unwrap_or(existing.is_mandatory))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, CODE_TAKEN))?;

        let subject = Self::find_subject(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Subject not found")))?;

        tx.commit().await.context("Failed to commit subject")?;

        Ok(subject)
    }

    #[instrument(skip(db))]
    pub async fn deactivate_subject(db: &SqlitePool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE subjects SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to deactivate subject")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Subject not found")));
        }

        Ok(())
    }
}
