use anyhow::{Context, anyhow};
use chrono::Utc;
use emsu_core::{AppError, PaginationMeta};
use emsu_models::{
    CreateTeacherDto, PaginatedTeachersResponse, Teacher, TeacherFilterParams, UpdateTeacherDto,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::instrument;

use crate::modules::users::service::normalize_email;
use crate::utils::query::{
    map_write_error, push_active_filter, push_page, push_search, value_taken,
};

const TEACHER_SELECT: &str = "SELECT id, teacher_id, first_name, last_name, \
     first_name || ' ' || last_name AS full_name, email, phone, address, subject, \
     qualification, hire_date, salary, is_active, profile_picture, experience_years, \
     department, specialization, emergency_contact, blood_group FROM teachers";

const TEACHER_ID_TAKEN: &str = "Teacher ID already exists";
const EMAIL_TAKEN: &str = "Email already registered";

pub struct TeacherService;

impl TeacherService {
    pub async fn find_teacher<'e, E>(db: E, id: i64) -> Result<Option<Teacher>, AppError>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Teacher>(&format!("{TEACHER_SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch teacher")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_teacher(db: &SqlitePool, id: i64) -> Result<Teacher, AppError> {
        Self::find_teacher(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Teacher not found")))
    }

    async fn check_unique(
        conn: &mut SqliteConnection,
        teacher_id: &str,
        email: &str,
        exclude_id: Option<i64>,
    ) -> Result<(), AppError> {
        if value_taken(&mut *conn, "teachers", "teacher_id", teacher_id, exclude_id).await? {
            return Err(AppError::bad_request(anyhow!(TEACHER_ID_TAKEN)));
        }
        if value_taken(&mut *conn, "teachers", "email", email, exclude_id).await? {
            return Err(AppError::bad_request(anyhow!(EMAIL_TAKEN)));
        }
        Ok(())
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, params: &TeacherFilterParams) {
        push_active_filter(qb, "is_active", params.include_inactive);
        if let Some(search) = &params.search {
            push_search(qb, &["first_name", "last_name", "teacher_id", "email"], search);
        }
        if let Some(subject) = &params.subject {
            qb.push(" AND subject = ").push_bind(subject.clone());
        }
        if let Some(department) = &params.department {
            qb.push(" AND department = ").push_bind(department.clone());
        }
    }

    #[instrument(skip(db))]
    pub async fn list_teachers(
        db: &SqlitePool,
        params: TeacherFilterParams,
    ) -> Result<PaginatedTeachersResponse, AppError> {
        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM teachers WHERE 1=1");
        Self::push_filters(&mut count_query, &params);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(db)
            .await
            .context("Failed to count teachers")
            .map_err(AppError::database)?;

        let mut query = QueryBuilder::<Sqlite>::new(TEACHER_SELECT);
        query.push(" WHERE 1=1");
        Self::push_filters(&mut query, &params);
        query.push(" ORDER BY last_name, first_name, id");
        push_page(&mut query, &params.pagination);

        let teachers = query
            .build_query_as::<Teacher>()
            .fetch_all(db)
            .await
            .context("Failed to fetch teachers")
            .map_err(AppError::database)?;

        Ok(PaginatedTeachersResponse {
            data: teachers,
            meta: PaginationMeta::new(&params.pagination, total),
        })
    }

    #[instrument(skip(db, dto), fields(teacher_id = %dto.teacher_id))]
    pub async fn create_teacher(
        db: &SqlitePool,
        dto: CreateTeacherDto,
    ) -> Result<Teacher, AppError> {
        let teacher_id = dto.teacher_id.trim().to_string();
        let email = normalize_email(&dto.email);

        let mut tx = db.begin().await.context("Failed to begin transaction")?;
        Self::check_unique(&mut tx, &teacher_id, &email, None).await?;

        let id = sqlx::query(
            "INSERT INTO teachers (teacher_id, first_name, last_name, email, phone, address, \
             subject, qualification, hire_date, salary, profile_picture, experience_years, \
             department, specialization, emergency_contact, blood_group) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&teacher_id)
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(&email)
        .bind(dto.phone)
        .bind(dto.address)
        .bind(dto.subject)
        .bind(dto.qualification)
        .bind(dto.hire_date.unwrap_or_else(Utc::now))
        .bind(dto.salary)
        .bind(dto.profile_picture)
        .bind(dto.experience_years)
        .bind(dto.department)
        .bind(dto.specialization)
        .bind(dto.emergency_contact)
        .bind(dto.blood_group)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, TEACHER_ID_TAKEN))?
        .last_insert_rowid();

        let teacher = Self::find_teacher(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::internal_error("Created teacher could not be read back"))?;

        tx.commit().await.context("Failed to commit teacher")?;

        Ok(teacher)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_teacher(
        db: &SqlitePool,
        id: i64,
        dto: UpdateTeacherDto,
    ) -> Result<Teacher, AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        let existing = Self::find_teacher(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Teacher not found")))?;

        let teacher_id = dto
            .teacher_id
            .map(|t| t.trim().to_string())
            .unwrap_or(existing.teacher_id);
        let email = dto
            .email
            .map(|e| normalize_email(&e))
            .unwrap_or(existing.email);
        Self::check_unique(&mut tx, &teacher_id, &email, Some(id)).await?;

        sqlx::query(
            "UPDATE teachers SET teacher_id = ?, first_name = ?, last_name = ?, email = ?, \
             phone = ?, address = ?, subject = ?, qualification = ?, hire_date = ?, salary = ?, \
             profile_picture = ?, experience_years = ?, department = ?, specialization = ?, \
             emergency_contact = ?, blood_group = ? WHERE id = ?",
        )
        .bind(&teacher_id)
        .bind(dto.first_name.unwrap_or(existing.first_name))
        .bind(dto.last_name.unwrap_or(existing.last_name))
        .bind(&email)
        .bind(dto.phone.unwrap_or(existing.phone))
        .bind(dto.address.unwrap_or(existing.address))
        .bind(dto.subject.unwrap_or(existing.subject))
        .bind(dto.qualification.unwrap_or(existing.qualification))
        .bind(dto.hire_date.unwrap_or(existing.hire_date))
        .bind(dto.salary.unwrap_or(existing.salary))
        .bind(dto.profile_picture.unwrap_or(existing.profile_picture))
        .bind(dto.experience_years.unwrap_or(existing.experience_years))
        .bind(dto.department.unwrap_or(existing.department))
        .bind(dto.specialization.unwrap_or(existing.specialization))
        .bind(dto.emergency_contact.unwrap_or(existing.emergency_contact))
        .bind(dto.blood_group.unwrap_or(existing.blood_group))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, TEACHER_ID_TAKEN))?;

        let teacher = Self::find_teacher(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Teacher not found")))?;

        tx.commit().await.context("Failed to commit teacher")?;

        Ok(teacher)
    }

    /// Soft delete, refused while the teacher is assigned to active classes.
    #[instrument(skip(db))]
    pub async fn deactivate_teacher(db: &SqlitePool, id: i64) -> Result<(), AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        if Self::find_teacher(&mut *tx, id).await?.is_none() {
            return Err(AppError::not_found(anyhow!("Teacher not found")));
        }

        let active_classes: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM classes WHERE teacher_id = ? AND is_active = 1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to count teacher classes")
        .map_err(AppError::database)?;

        if active_classes > 0 {
            return Err(AppError::bad_request(anyhow!(
                "Teacher is assigned to {} active class(es); reassign them first",
                active_classes
            )));
        }

        sqlx::query("UPDATE teachers SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to deactivate teacher")
            .map_err(AppError::database)?;

        tx.commit().await.context("Failed to commit teacher")?;

        Ok(())
    }
}
