use anyhow::Context;
use chrono::{NaiveDate, Utc};
use emsu_core::AppError;
use emsu_models::{AttendanceStatus, AttendanceSummary, DashboardStats, FeeSummary, round2};
use sqlx::SqlitePool;
use tracing::instrument;

pub struct DashboardService;

impl DashboardService {
    #[instrument(skip(db))]
    pub async fn get_stats(db: &SqlitePool) -> Result<DashboardStats, AppError> {
        let (students, teachers, classes, subjects): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT \
             (SELECT COUNT(*) FROM students WHERE is_active = 1), \
             (SELECT COUNT(*) FROM teachers WHERE is_active = 1), \
             (SELECT COUNT(*) FROM classes WHERE is_active = 1), \
             (SELECT COUNT(*) FROM subjects WHERE is_active = 1)",
        )
        .fetch_one(db)
        .await
        .context("Failed to count active records")
        .map_err(AppError::database)?;

        let attendance_today = Self::attendance_summary(db, Utc::now().date_naive()).await?;
        let fees = Self::fee_summary(db).await?;

        Ok(DashboardStats {
            students,
            teachers,
            classes,
            subjects,
            attendance_today,
            fees,
        })
    }

    pub async fn attendance_summary(
        db: &SqlitePool,
        date: NaiveDate,
    ) -> Result<AttendanceSummary, AppError> {
        let rows: Vec<(AttendanceStatus, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM attendance \
             WHERE date = ? AND is_active = 1 GROUP BY status",
        )
        .bind(date)
        .fetch_all(db)
        .await
        .context("Failed to summarize attendance")
        .map_err(AppError::database)?;

        let mut summary = AttendanceSummary {
            date,
            ..Default::default()
        };
        for (status, count) in rows {
            match status {
                AttendanceStatus::Present => summary.present = count,
                AttendanceStatus::Absent => summary.absent = count,
                AttendanceStatus::Late => summary.late = count,
                AttendanceStatus::Excused => summary.excused = count,
            }
            summary.total += count;
        }

        Ok(summary)
    }

    /// Totals over active fees. Waived fees are billed but never outstanding.
    pub async fn fee_summary(db: &SqlitePool) -> Result<FeeSummary, AppError> {
        let summary: FeeSummary = sqlx::query_as(
            "SELECT \
             TOTAL(amount + late_fee - discount_amount) AS total_billed, \
             TOTAL(paid_amount) AS total_paid, \
             TOTAL(CASE WHEN status != 'Waived' \
                   THEN amount + late_fee - discount_amount - paid_amount END) AS outstanding, \
             COUNT(CASE WHEN status = 'Pending' THEN 1 END) AS pending_count, \
             COUNT(CASE WHEN status = 'Overdue' THEN 1 END) AS overdue_count, \
             COUNT(CASE WHEN status = 'Partial' THEN 1 END) AS partial_count \
             FROM fees WHERE is_active = 1",
        )
        .fetch_one(db)
        .await
        .context("Failed to summarize fees")
        .map_err(AppError::database)?;

        Ok(FeeSummary {
            total_billed: round2(summary.total_billed),
            total_paid: round2(summary.total_paid),
            outstanding: round2(summary.outstanding),
            ..summary
        })
    }
}
