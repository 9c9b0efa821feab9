use anyhow::{Context, anyhow};
use emsu_core::{AppError, PaginationMeta};
use emsu_models::{
    CreateGradeDto, Grade, GradeFilterParams, GradeResponse, PaginatedGradesResponse,
    UpdateGradeDto,
};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::instrument;

use crate::utils::query::{
    ensure_exists, map_write_error, push_active_filter, push_page, push_search,
};

const GRADE_SELECT: &str = "SELECT g.id, g.student_id, \
     s.first_name || ' ' || s.last_name AS student_name, g.subject, g.exam_type, \
     g.marks_obtained, g.total_marks, g.grade_letter, g.semester, g.academic_year, \
     g.teacher_id, t.first_name || ' ' || t.last_name AS teacher_name, g.exam_date, \
     g.remarks, g.weight, g.is_active, g.created_at \
     FROM grades g \
     LEFT JOIN students s ON s.id = g.student_id \
     LEFT JOIN teachers t ON t.id = g.teacher_id";

const GRADE_ORDER: &str = " ORDER BY g.created_at DESC, g.id DESC";

pub struct GradeService;

impl GradeService {
    pub async fn find_grade<'e, E>(db: E, id: i64) -> Result<Option<Grade>, AppError>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Grade>(&format!("{GRADE_SELECT} WHERE g.id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch grade")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_grade(db: &SqlitePool, id: i64) -> Result<GradeResponse, AppError> {
        Self::find_grade(db, id)
            .await?
            .map(GradeResponse::from)
            .ok_or_else(|| AppError::not_found(anyhow!("Grade not found")))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, params: &GradeFilterParams) {
        push_active_filter(qb, "g.is_active", params.include_inactive);
        if let Some(search) = &params.search {
            push_search(qb, &["g.subject", "g.exam_type", "g.remarks"], search);
        }
        if let Some(student_id) = params.student_id {
            qb.push(" AND g.student_id = ").push_bind(student_id);
        }
        if let Some(teacher_id) = params.teacher_id {
            qb.push(" AND g.teacher_id = ").push_bind(teacher_id);
        }
        if let Some(subject) = &params.subject {
            qb.push(" AND g.subject = ").push_bind(subject.clone());
        }
        if let Some(exam_type) = &params.exam_type {
            qb.push(" AND g.exam_type = ").push_bind(exam_type.clone());
        }
        if let Some(semester) = &params.semester {
            qb.push(" AND g.semester = ").push_bind(semester.clone());
        }
        if let Some(academic_year) = &params.academic_year {
            qb.push(" AND g.academic_year = ").push_bind(academic_year.clone());
        }
    }

    #[instrument(skip(db))]
    pub async fn list_grades(
        db: &SqlitePool,
        params: GradeFilterParams,
    ) -> Result<PaginatedGradesResponse, AppError> {
        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM grades g WHERE 1=1");
        Self::push_filters(&mut count_query, &params);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(db)
            .await
            .context("Failed to count grades")
            .map_err(AppError::database)?;

        let mut query = QueryBuilder::<Sqlite>::new(GRADE_SELECT);
        query.push(" WHERE 1=1");
        Self::push_filters(&mut query, &params);
        query.push(GRADE_ORDER);
        push_page(&mut query, &params.pagination);

        let grades = query
            .build_query_as::<Grade>()
            .fetch_all(db)
            .await
            .context("Failed to fetch grades")
            .map_err(AppError::database)?;

        Ok(PaginatedGradesResponse {
            data: grades.into_iter().map(GradeResponse::from).collect(),
            meta: PaginationMeta::new(&params.pagination, total),
        })
    }

    /// Active grades of one student, whether or not the student is active.
    #[instrument(skip(db))]
    pub async fn list_for_student(
        db: &SqlitePool,
        student_id: i64,
    ) -> Result<Vec<GradeResponse>, AppError> {
        let grades = sqlx::query_as::<_, Grade>(&format!(
            "{GRADE_SELECT} WHERE g.student_id = ? AND g.is_active = 1{GRADE_ORDER}"
        ))
        .bind(student_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch student grades")
        .map_err(AppError::database)?;

        Ok(grades.into_iter().map(GradeResponse::from).collect())
    }

    #[instrument(skip(db, dto), fields(student_id = dto.student_id))]
    pub async fn create_grade(
        db: &SqlitePool,
        dto: CreateGradeDto,
    ) -> Result<GradeResponse, AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        ensure_exists(&mut *tx, "students", dto.student_id, "Student not found").await?;
        if let Some(teacher_id) = dto.teacher_id {
            ensure_exists(&mut *tx, "teachers", teacher_id, "Teacher not found").await?;
        }

        let id = sqlx::query(
            "INSERT INTO grades (student_id, subject, exam_type, marks_obtained, total_marks, \
             grade_letter, semester, academic_year, teacher_id, exam_date, remarks, weight) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(dto.student_id)
        .bind(dto.subject.trim())
        .bind(dto.exam_type.trim())
        .bind(dto.marks_obtained)
        .bind(dto.total_marks)
        .bind(dto.grade_letter)
        .bind(dto.semester)
        .bind(dto.academic_year)
        .bind(dto.teacher_id)
        .bind(dto.exam_date)
        .bind(dto.remarks)
        .bind(dto.weight.unwrap_or(1.0))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Grade already exists"))?
        .last_insert_rowid();

        let grade = Self::find_grade(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::internal_error("Created grade could not be read back"))?;

        tx.commit().await.context("Failed to commit grade")?;

        Ok(grade.into())
    }

    #[instrument(skip(db, dto))]
    pub async fn update_grade(
        db: &SqlitePool,
        id: i64,
        dto: UpdateGradeDto,
    ) -> Result<GradeResponse, AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        let existing = Self::find_grade(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Grade not found")))?;

        if let Some(student_id) = dto.student_id {
            ensure_exists(&mut *tx, "students", student_id, "Student not found").await?;
        }
        if let Some(Some(teacher_id)) = dto.teacher_id {
            ensure_exists(&mut *tx, "teachers", teacher_id, "Teacher not found").await?;
        }

        sqlx::query(
            "UPDATE grades SET student_id = ?, subject = ?, exam_type = ?, marks_obtained = ?, \
             total_marks = ?, grade_letter = ?, semester = ?, academic_year = ?, teacher_id = ?, \
             exam_date = ?, remarks = ?, weight = ? WHERE id = ?",
        )
        .bind(dto.student_id.unwrap_or(existing.student_id))
        .bind(dto.subject.unwrap_or(existing.subject))
        .bind(dto.exam_type.unwrap_or(existing.exam_type))
        .bind(dto.marks_obtained.unwrap_or(existing.marks_obtained))
        .bind(dto.total_marks.unwrap_or(existing.total_marks))
        .bind(dto.grade_letter.unwrap_or(existing.grade_letter))
        .bind(dto.semester.unwrap_or(existing.semester))
        .bind(dto.academic_year.unwrap_or(existing.academic_year))
        .bind(dto.teacher_id.unwrap_or(existing.teacher_id))
        .bind(dto.exam_date.unwrap_or(existing.exam_date))
        .bind(dto.remarks.unwrap_or(existing.remarks))
        .bind(dto.weight.unwrap_or(existing.weight))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Grade already exists"))?;

        let grade = Self::find_grade(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Grade not found")))?;

        tx.commit().await.context("Failed to commit grade")?;

        Ok(grade.into())
    }

    #[instrument(skip(db))]
    pub async fn deactivate_grade(db: &SqlitePool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE grades SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to deactivate grade")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Grade not found")));
        }

        Ok(())
    }
}
