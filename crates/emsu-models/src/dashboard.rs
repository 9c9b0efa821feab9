//! Read-only aggregates for the dashboard.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct DashboardStats {
    pub students: i64,
    pub teachers: i64,
    pub classes: i64,
    pub subjects: i64,
    pub attendance_today: AttendanceSummary,
    pub fees: FeeSummary,
}

/// Counts of today's active attendance records by status.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct AttendanceSummary {
    pub date: NaiveDate,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub excused: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, ToSchema)]
pub struct FeeSummary {
    /// Sum of `amount + late_fee - discount_amount`
    pub total_billed: f64,
    pub total_paid: f64,
    pub outstanding: f64,
    pub pending_count: i64,
    pub overdue_count: i64,
    pub partial_count: i64,
}
