//! Attendance domain models and DTOs.
//!
//! One logical record per student, class and date is expected but not
//! enforced; duplicates are accepted.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use emsu_core::serde::{
    deserialize_nullable, deserialize_optional_bool, deserialize_optional_i64,
    deserialize_optional_trimmed,
};
use emsu_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Attendance {
    pub id: i64,
    pub student_id: i64,
    pub student_name: Option<String>,
    pub class_id: i64,
    pub class_name: Option<String>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// User who recorded the entry
    pub marked_by: Option<i64>,
    pub notes: Option<String>,
    #[schema(value_type = Option<String>, example = "08:00:00")]
    pub time_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "14:30:00")]
    pub time_out: Option<NaiveTime>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// `marked_by` is taken from the caller, never from the payload.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAttendanceDto {
    pub student_id: i64,
    pub class_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    #[schema(value_type = Option<String>, example = "08:00:00")]
    pub time_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "14:30:00")]
    pub time_out: Option<NaiveTime>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAttendanceDto {
    pub student_id: Option<i64>,
    pub class_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>, example = "08:00:00")]
    pub time_in: Option<Option<NaiveTime>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>, example = "08:00:00")]
    pub time_out: Option<Option<NaiveTime>>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceFilterParams {
    /// Case-insensitive match on student name or notes
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub student_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub class_id: Option<i64>,
    pub date: Option<NaiveDate>,
    /// Inclusive lower bound on `date`
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on `date`
    pub date_to: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub include_inactive: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedAttendanceResponse {
    pub data: Vec<Attendance>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parses_lowercase() {
        let status: AttendanceStatus = serde_json::from_str(r#""late""#).unwrap();
        assert_eq!(status, AttendanceStatus::Late);
        assert!(serde_json::from_str::<AttendanceStatus>(r#""missing""#).is_err());
    }

    #[test]
    fn test_create_attendance_dto_parses_times() {
        let dto: CreateAttendanceDto = serde_json::from_value(serde_json::json!({
            "student_id": 1,
            "class_id": 2,
            "date": "2024-09-02",
            "status": "present",
            "time_in": "08:05:00"
        }))
        .unwrap();
        assert_eq!(dto.date, NaiveDate::from_ymd_opt(2024, 9, 2).unwrap());
        assert_eq!(dto.time_in, NaiveTime::from_hms_opt(8, 5, 0));
        assert!(dto.time_out.is_none());
    }
}
