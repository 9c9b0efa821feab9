use anyhow::{Context, anyhow};
use emsu_core::{AppError, PaginationMeta};
use emsu_models::{
    CreateFeeDto, Fee, FeeFilterParams, FeeResponse, PaginatedFeesResponse, UpdateFeeDto,
};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::instrument;

use crate::utils::query::{
    ensure_exists, map_write_error, push_active_filter, push_page, push_search,
};

const FEE_SELECT: &str = "SELECT f.id, f.student_id, \
     s.first_name || ' ' || s.last_name AS student_name, f.fee_type, f.amount, f.due_date, \
     f.paid_amount, f.status, f.payment_date, f.payment_method, f.semester, f.academic_year, \
     f.transaction_id, f.discount_amount, f.late_fee, f.receipt_number, f.is_active, \
     f.created_at \
     FROM fees f \
     LEFT JOIN students s ON s.id = f.student_id";

const FEE_ORDER: &str = " ORDER BY f.due_date DESC, f.id DESC";

pub struct FeeService;

impl FeeService {
    pub async fn find_fee<'e, E>(db: E, id: i64) -> Result<Option<Fee>, AppError>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Fee>(&format!("{FEE_SELECT} WHERE f.id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch fee")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_fee(db: &SqlitePool, id: i64) -> Result<FeeResponse, AppError> {
        Self::find_fee(db, id)
            .await?
            .map(FeeResponse::from)
            .ok_or_else(|| AppError::not_found(anyhow!("Fee not found")))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, params: &FeeFilterParams) {
        push_active_filter(qb, "f.is_active", params.include_inactive);
        if let Some(search) = &params.search {
            push_search(
                qb,
                &["f.fee_type", "f.receipt_number", "f.transaction_id"],
                search,
            );
        }
        if let Some(student_id) = params.student_id {
            qb.push(" AND f.student_id = ").push_bind(student_id);
        }
        if let Some(status) = params.status {
            qb.push(" AND f.status = ").push_bind(status);
        }
        if let Some(fee_type) = &params.fee_type {
            qb.push(" AND f.fee_type = ").push_bind(fee_type.clone());
        }
        if let Some(semester) = &params.semester {
            qb.push(" AND f.semester = ").push_bind(semester.clone());
        }
        if let Some(academic_year) = &params.academic_year {
            qb.push(" AND f.academic_year = ").push_bind(academic_year.clone());
        }
    }

    #[instrument(skip(db))]
    pub async fn list_fees(
        db: &SqlitePool,
        params: FeeFilterParams,
    ) -> Result<PaginatedFeesResponse, AppError> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM fees f WHERE 1=1");
        Self::push_filters(&mut count_query, &params);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(db)
            .await
            .context("Failed to count fees")
            .map_err(AppError::database)?;

        let mut query = QueryBuilder::<Sqlite>::new(FEE_SELECT);
        query.push(" WHERE 1=1");
        Self::push_filters(&mut query, &params);
        query.push(FEE_ORDER);
        push_page(&mut query, &params.pagination);

        let fees = query
            .build_query_as::<Fee>()
            .fetch_all(db)
            .await
            .context("Failed to fetch fees")
            .map_err(AppError::database)?;

        Ok(PaginatedFeesResponse {
            data: fees.into_iter().map(FeeResponse::from).collect(),
            meta: PaginationMeta::new(&params.pagination, total),
        })
    }

    /// Active fees of one student, whether or not the student is active.
    #[instrument(skip(db))]
    pub async fn list_for_student(
        db: &SqlitePool,
        student_id: i64,
    ) -> Result<Vec<FeeResponse>, AppError> {
        let fees = sqlx::query_as::<_, Fee>(&format!(
            "{FEE_SELECT} WHERE f.student_id = ? AND f.is_active = 1{FEE_ORDER}"
        ))
        .bind(student_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch student fees")
        .map_err(AppError::database)?;

        Ok(fees.into_iter().map(FeeResponse::from).collect())
    }

    /// Status is stored as given (default `Pending`), independent of
    /// `paid_amount`.
    #[instrument(skip(db, dto), fields(student_id = dto.student_id))]
    pub async fn create_fee(db: &SqlitePool, dto: CreateFeeDto) -> Result<FeeResponse, AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        ensure_exists(&mut *tx, "students", dto.student_id, "Student not found").await?;

        let id = sqlx::query(
            "INSERT INTO fees (student_id, fee_type, amount, due_date, paid_amount, status, \
             payment_date, payment_method, semester, academic_year, transaction_id, \
             discount_amount, late_fee, receipt_number) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(dto.student_id)
        .bind(dto.fee_type.trim())
        .bind(dto.amount)
        .bind(dto.due_date)
        .bind(dto.paid_amount.unwrap_or(0.0))
        .bind(dto.status.unwrap_or_default())
        .bind(dto.payment_date)
        .bind(dto.payment_method)
        .bind(dto.semester)
        .bind(dto.academic_year)
        .bind(dto.transaction_id)
        .bind(dto.discount_amount.unwrap_or(0.0))
        .bind(dto.late_fee.unwrap_or(0.0))
        .bind(dto.receipt_number)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Fee already exists"))?
        .last_insert_rowid();

        let fee = Self::find_fee(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::internal_error("Created fee could not be read back"))?;

        tx.commit().await.context("Failed to commit fee")?;

        Ok(fee.into())
    }

    #[instrument(skip(db, dto))]
    pub async fn update_fee(
        db: &SqlitePool,
        id: i64,
        dto: UpdateFeeDto,
    ) -> Result<FeeResponse, AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        let existing = Self::find_fee(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Fee not found")))?;

        if let Some(student_id) = dto.student_id {
            ensure_exists(&mut *tx, "students", student_id, "Student not found").await?;
        }

        sqlx::query(
            "UPDATE fees SET student_id = ?, fee_type = ?, amount = ?, due_date = ?, \
             paid_amount = ?, status = ?, payment_date = ?, payment_method = ?, semester = ?, \
             academic_year = ?, transaction_id = ?, discount_amount = ?, late_fee = ?, \
             receipt_number = ? WHERE id = ?",
        )
        .bind(dto.student_id.unwrap_or(existing.student_id))
        .bind(dto.fee_type.unwrap_or(existing.fee_type))
        .bind(dto.amount.unwrap_or(existing.amount))
        .bind(dto.due_date.unwrap_or(existing.due_date))
        .bind(dto.paid_amount.unwrap_or(existing.paid_amount))
        .bind(dto.status.unwrap_or(existing.status))
        .bind(dto.payment_date.unwrap_or(existing.payment_date))
        .bind(dto.payment_method.unwrap_or(existing.payment_method))
        .bind(dto.semester.unwrap_or(existing.semester))
        .bind(dto.academic_year.unwrap_or(existing.academic_year))
        .bind(dto.transaction_id.unwrap_or(existing.transaction_id))
        .bind(dto.discount_amount.unwrap_or(existing.discount_amount))
        .bind(dto.late_fee.unwrap_or(existing.late_fee))
        .bind(dto.receipt_number.unwrap_or(existing.receipt_number))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Fee already exists"))?;

        let fee = Self::find_fee(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Fee not found")))?;

        tx.commit().await.context("Failed to commit fee")?;

        Ok(fee.into())
    }

    #[instrument(skip(db))]
    pub async fn deactivate_fee(db: &SqlitePool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE fees SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to deactivate fee")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Fee not found")));
        }

        Ok(())
    }
}
