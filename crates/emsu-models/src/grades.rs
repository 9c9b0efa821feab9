//! Grade domain models and DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use emsu_core::serde::{
    deserialize_nullable, deserialize_optional_bool, deserialize_optional_i64,
    deserialize_optional_trimmed,
};
use emsu_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::round2;

/// `marks_obtained / total_marks * 100`, rounded to 2 decimals.
///
/// Returns `None` when `total_marks` is not positive.
pub fn percentage(marks_obtained: f64, total_marks: f64) -> Option<f64> {
    if total_marks <= 0.0 {
        return None;
    }
    Some(round2(marks_obtained / total_marks * 100.0))
}

/// A grade row as stored, with joined display names.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub student_name: Option<String>,
    pub subject: String,
    /// quiz, midterm, final, assignment, project
    pub exam_type: String,
    pub marks_obtained: f64,
    pub total_marks: f64,
    pub grade_letter: Option<String>,
    pub semester: Option<String>,
    pub academic_year: Option<String>,
    pub teacher_id: Option<i64>,
    pub teacher_name: Option<String>,
    pub exam_date: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub weight: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Grade {
    pub fn percentage(&self) -> Option<f64> {
        percentage(self.marks_obtained, self.total_marks)
    }
}

/// Grade as returned by the API, with the computed percentage.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GradeResponse {
    #[serde(flatten)]
    pub grade: Grade,
    /// `null` when `total_marks` is zero
    pub percentage: Option<f64>,
}

impl From<Grade> for GradeResponse {
    fn from(grade: Grade) -> Self {
        let percentage = grade.percentage();
        Self { grade, percentage }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateGradeDto {
    pub student_id: i64,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(length(min = 1, max = 50))]
    pub exam_type: String,
    #[validate(range(min = 0.0))]
    pub marks_obtained: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub total_marks: f64,
    #[validate(length(max = 2))]
    pub grade_letter: Option<String>,
    #[validate(length(max = 20))]
    pub semester: Option<String>,
    #[validate(length(max = 10))]
    pub academic_year: Option<String>,
    pub teacher_id: Option<i64>,
    pub exam_date: Option<NaiveDate>,
    pub remarks: Option<String>,
    /// Defaults to 1.0
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateGradeDto {
    pub student_id: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub exam_type: Option<String>,
    #[validate(range(min = 0.0))]
    pub marks_obtained: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub total_marks: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 2))]
    pub grade_letter: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 20))]
    pub semester: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 10))]
    pub academic_year: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<i64>)]
    pub teacher_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<NaiveDate>)]
    pub exam_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    pub remarks: Option<Option<String>>,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GradeFilterParams {
    /// Case-insensitive match on subject, exam type or remarks
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub student_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub teacher_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub exam_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub semester: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub include_inactive: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedGradesResponse {
    pub data: Vec<GradeResponse>,
    pub meta: PaginationMeta,
}
