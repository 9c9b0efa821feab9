//! Student domain models and DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use emsu_core::serde::{
    deserialize_nullable, deserialize_optional_bool, deserialize_optional_trimmed,
    deserialize_trimmed, deserialize_trimmed_option,
};
use emsu_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// A student record.
///
/// `student_id` and `email` are unique across active and inactive rows.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Student {
    pub id: i64,
    /// School-issued identifier, e.g. `STU-2024-001`
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub grade: String,
    pub enrollment_date: DateTime<Utc>,
    pub is_active: bool,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub guardian_email: Option<String>,
    pub profile_picture: Option<String>,
    pub medical_info: Option<String>,
    pub emergency_contact: Option<String>,
    pub transport_mode: Option<String>,
    pub blood_group: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 20))]
    pub student_id: String,
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
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(min = 1, max = 20))]
    pub grade: String,
    /// Defaults to now
    pub enrollment_date: Option<DateTime<Utc>>,
    #[validate(length(max = 100))]
    pub guardian_name: Option<String>,
    #[validate(length(max = 20))]
    pub guardian_phone: Option<String>,
    #[validate(email)]
    pub guardian_email: Option<String>,
    #[validate(length(max = 255))]
    pub profile_picture: Option<String>,
    pub medical_info: Option<String>,
    #[validate(length(max = 20))]
    pub emergency_contact: Option<String>,
    #[validate(length(max = 50))]
    pub transport_mode: Option<String>,
    #[validate(length(max = 5))]
    pub blood_group: Option<String>,
}

/// Partial update. Absent keys keep their value; `null` clears a nullable
/// column.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 20))]
    pub student_id: Option<String>,
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
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[validate(length(min = 1, max = 20))]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 100))]
    pub guardian_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 20))]
    pub guardian_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(email)]
    pub guardian_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 255))]
    pub profile_picture: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    pub medical_info: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 20))]
    pub emergency_contact: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 50))]
    pub transport_mode: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 5))]
    pub blood_group: Option<Option<String>>,
}

/// Query parameters for listing students.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentFilterParams {
    /// Case-insensitive match on first name, last name, student ID or email
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub include_inactive: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub data: Vec<Student>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_dto() -> CreateStudentDto {
        serde_json::from_value(serde_json::json!({
            "student_id": "STU-001",
            "first_name": "John",
            "last_name": "Doe",
            "email": "john.doe@example.com",
            "grade": "10"
        }))
        .unwrap()
    }

    #[test]
    fn test_create_student_dto_minimal_payload() {
        let dto = valid_dto();
        assert!(dto.validate().is_ok());
        assert!(dto.phone.is_none());
        assert!(dto.enrollment_date.is_none());
    }

    #[test]
    fn test_create_student_dto_invalid_email() {
        let dto = CreateStudentDto {
            email: "invalid-email".to_string(),
            ..valid_dto()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_student_dto_empty_student_id() {
        let dto = CreateStudentDto {
            student_id: String::new(),
            ..valid_dto()
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("student_id"));
    }

    #[test]
    fn test_update_student_dto_invalid_guardian_email() {
        let dto: UpdateStudentDto =
            serde_json::from_str(r#"{"guardian_email": "nope"}"#).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_student_dto_only_present_keys() {
        let dto: UpdateStudentDto =
            serde_json::from_str(r#"{"grade": "11", "address": null}"#).unwrap();
        assert_eq!(dto.grade.as_deref(), Some("11"));
        assert_eq!(dto.address, Some(None));
        assert!(dto.first_name.is_none());
        assert!(dto.phone.is_none());
        assert!(dto.validate().is_ok());
    }
}
