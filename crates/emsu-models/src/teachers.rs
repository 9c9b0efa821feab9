//! Teacher domain models and DTOs.

use chrono::{DateTime, Utc};
use emsu_core::serde::{
    deserialize_nullable, deserialize_optional_bool, deserialize_optional_trimmed,
    deserialize_trimmed, deserialize_trimmed_option,
};
use emsu_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Teacher {
    pub id: i64,
    /// School-issued identifier, e.g. `TCH-014`
    pub teacher_id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub subject: Option<String>,
    pub qualification: Option<String>,
    pub hire_date: DateTime<Utc>,
    pub salary: Option<f64>,
    pub is_active: bool,
    pub profile_picture: Option<String>,
    pub experience_years: Option<i64>,
    pub department: Option<String>,
    pub specialization: Option<String>,
    pub emergency_contact: Option<String>,
    pub blood_group: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTeacherDto {
    #[validate(length(min = 1, max = 20))]
    pub teacher_id: String,
    #[validate(length(min = 1, max = 80))]
    pub first_name: String,
    #[validate(length(min = 1, max = 80))]
    pub last_name: String,
    #[serde(deserialize_with = "deserialize_trimmed")]
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub subject: Option<String>,
    #[validate(length(max = 200))]
    pub qualification: Option<String>,
    /// Defaults to now
    pub hire_date: Option<DateTime<Utc>>,
    #[validate(range(min = 0.0))]
    pub salary: Option<f64>,
    #[validate(length(max = 255))]
    pub profile_picture: Option<String>,
    #[validate(range(min = 0))]
    pub experience_years: Option<i64>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(length(max = 200))]
    pub specialization: Option<String>,
    #[validate(length(max = 20))]
    pub emergency_contact: Option<String>,
    #[validate(length(max = 5))]
    pub blood_group: Option<String>,
}

/// Partial update. Absent keys keep their value; `null` clears a nullable
/// column.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTeacherDto {
    #[validate(length(min = 1, max = 20))]
    pub teacher_id: Option<String>,
    #[validate(length(min = 1, max = 80))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 80))]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_trimmed_option")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 20))]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 100))]
    pub subject: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 200))]
    pub qualification: Option<Option<String>>,
    pub hire_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<f64>)]
    #[validate(range(min = 0.0))]
    pub salary: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 255))]
    pub profile_picture: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<i64>)]
    #[validate(range(min = 0))]
    pub experience_years: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 100))]
    pub department: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 200))]
    pub specialization: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 20))]
    pub emergency_contact: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 5))]
    pub blood_group: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeacherFilterParams {
    /// Case-insensitive match on first name, last name, teacher ID or email
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub include_inactive: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedTeachersResponse {
    pub data: Vec<Teacher>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_teacher_dto_rejects_negative_salary() {
        let dto: CreateTeacherDto = serde_json::from_value(serde_json::json!({
            "teacher_id": "TCH-001",
            "first_name": "Alan",
            "last_name": "Turing",
            "email": "alan@school.com",
            "salary": -10.0
        }))
        .unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("salary"));
    }

    #[test]
    fn test_update_teacher_dto_clears_salary() {
        let dto: UpdateTeacherDto = serde_json::from_str(r#"{"salary": null}"#).unwrap();
        assert_eq!(dto.salary, Some(None));
        assert!(dto.validate().is_ok());
    }
}
