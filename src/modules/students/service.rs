use anyhow::{Context, anyhow};
use chrono::Utc;
use emsu_core::{AppError, PaginationMeta};
use emsu_models::{
    CreateStudentDto, PaginatedStudentsResponse, Student, StudentFilterParams, UpdateStudentDto,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::instrument;

use crate::modules::users::service::normalize_email;
use crate::utils::query::{
    map_write_error, push_active_filter, push_page, push_search, value_taken,
};

const STUDENT_SELECT: &str = "SELECT id, student_id, first_name, last_name, \
     first_name || ' ' || last_name AS full_name, email, phone, address, date_of_birth, \
     grade, enrollment_date, is_active, guardian_name, guardian_phone, guardian_email, \
     profile_picture, medical_info, emergency_contact, transport_mode, blood_group \
     FROM students";

const STUDENT_ID_TAKEN: &str = "Student ID already exists";
const EMAIL_TAKEN: &str = "Email already registered";

pub struct StudentService;

impl StudentService {
    pub async fn find_student<'e, E>(db: E, id: i64) -> Result<Option<Student>, AppError>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Student>(&format!("{STUDENT_SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch student")
            .map_err(AppError::database)
    }

    /// Inactive students are returned too.
    #[instrument(skip(db))]
    pub async fn get_student(db: &SqlitePool, id: i64) -> Result<Student, AppError> {
        Self::find_student(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    async fn check_unique(
        conn: &mut SqliteConnection,
        student_id: &str,
        email: &str,
        exclude_id: Option<i64>,
    ) -> Result<(), AppError> {
        if value_taken(&mut *conn, "students", "student_id", student_id, exclude_id).await? {
            return Err(AppError::bad_request(anyhow!(STUDENT_ID_TAKEN)));
        }
        if value_taken(&mut *conn, "students", "email", email, exclude_id).await? {
            return Err(AppError::bad_request(anyhow!(EMAIL_TAKEN)));
        }
        Ok(())
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, params: &StudentFilterParams) {
        push_active_filter(qb, "is_active", params.include_inactive);
        if let Some(search) = &params.search {
            push_search(qb, &["first_name", "last_name", "student_id", "email"], search);
        }
        if let Some(grade) = &params.grade {
            qb.push(" AND grade = ").push_bind(grade.clone());
        }
    }

    #[instrument(skip(db))]
    pub async fn list_students(
        db: &SqlitePool,
        params: StudentFilterParams,
    ) -> Result<PaginatedStudentsResponse, AppError> {
        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM students WHERE 1=1");
        Self::push_filters(&mut count_query, &params);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(db)
            .await
            .context("Failed to count students")
            .map_err(AppError::database)?;

        let mut query = QueryBuilder::<Sqlite>::new(STUDENT_SELECT);
        query.push(" WHERE 1=1");
        Self::push_filters(&mut query, &params);
        query.push(" ORDER BY last_name, first_name, id");
        push_page(&mut query, &params.pagination);

        let students = query
            .build_query_as::<Student>()
            .fetch_all(db)
            .await
            .context("Failed to fetch students")
            .map_err(AppError::database)?;

        Ok(PaginatedStudentsResponse {
            data: students,
            meta: PaginationMeta::new(&params.pagination, total),
        })
    }

    /// Inserts a student after checking that neither the student ID nor the
    /// email is used by any row, active or not.
    #[instrument(skip(db, dto), fields(student_id = %dto.student_id))]
    pub async fn create_student(
        db: &SqlitePool,
        dto: CreateStudentDto,
    ) -> Result<Student, AppError> {
        let student_id = dto.student_id.trim().to_string();
        let email = normalize_email(&dto.email);

        let mut tx = db.begin().await.context("Failed to begin transaction")?;
        Self::check_unique(&mut tx, &student_id, &email, None).await?;

        let id = sqlx::query(
            "INSERT INTO students (student_id, first_name, last_name, email, phone, address, \
             date_of_birth, grade, enrollment_date, guardian_name, guardian_phone, \
             guardian_email, profile_picture, medical_info, emergency_contact, transport_mode, \
             blood_group) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&student_id)
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(&email)
        .bind(dto.phone)
        .bind(dto.address)
        .bind(dto.date_of_birth)
        .bind(dto.grade.trim())
        .bind(dto.enrollment_date.unwrap_or_else(Utc::now))
        .bind(dto.guardian_name)
        .bind(dto.guardian_phone)
        .bind(dto.guardian_email)
        .bind(dto.profile_picture)
        .bind(dto.medical_info)
        .bind(dto.emergency_contact)
        .bind(dto.transport_mode)
        .bind(dto.blood_group)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, STUDENT_ID_TAKEN))?
        .last_insert_rowid();

        let student = Self::find_student(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::internal_error("Created student could not be read back"))?;

        tx.commit().await.context("Failed to commit student")?;

        Ok(student)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &SqlitePool,
        id: i64,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        let existing = Self::find_student(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        let student_id = dto
            .student_id
            .map(|s| s.trim().to_string())
            .unwrap_or(existing.student_id);
        let email = dto
            .email
            .map(|e| normalize_email(&e))
            .unwrap_or(existing.email);
        Self::check_unique(&mut tx, &student_id, &email, Some(id)).await?;

        sqlx::query(
            "UPDATE students SET student_id = ?, first_name = ?, last_name = ?, email = ?, \
             phone = ?, address = ?, date_of_birth = ?, grade = ?, guardian_name = ?, \
             guardian_phone = ?, guardian_email = ?, profile_picture = ?, medical_info = ?, \
             emergency_contact = ?, transport_mode = ?, blood_group = ? WHERE id = ?",
        )
        .bind(&student_id)
        .bind(dto.first_name.unwrap_or(existing.first_name))
        .bind(dto.last_name.unwrap_or(existing.last_name))
        .bind(&email)
        .bind(dto.phone.unwrap_or(existing.phone))
        .bind(dto.address.unwrap_or(existing.address))
        .bind(dto.date_of_birth.unwrap_or(existing.date_of_birth))
        .bind(dto.grade.unwrap_or(existing.grade))
        .bind(dto.guardian_name.unwrap_or(existing.guardian_name))
        .bind(dto.guardian_phone.unwrap_or(existing.guardian_phone))
        .bind(dto.guardian_email.unwrap_or(existing.guardian_email))
        .bind(dto.profile_picture.unwrap_or(existing.profile_picture))
        .bind(dto.medical_info.unwrap_or(existing.medical_info))
        .bind(dto.emergency_contact.unwrap_or(existing.emergency_contact))
        .bind(dto.transport_mode.unwrap_or(existing.transport_mode))
        .bind(dto.blood_group.unwrap_or(existing.blood_group))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, STUDENT_ID_TAKEN))?;

        let student = Self::find_student(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        tx.commit().await.context("Failed to commit student")?;

        Ok(student)
    }

    /// Soft delete. Grades, fees and attendance stay untouched.
    #[instrument(skip(db))]
    pub async fn deactivate_student(db: &SqlitePool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE students SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to deactivate student")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        Ok(())
    }
}
