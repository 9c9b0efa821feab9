//! Class domain models and DTOs.

use emsu_core::serde::{
    deserialize_nullable, deserialize_optional_bool, deserialize_optional_i64,
    deserialize_optional_trimmed,
};
use emsu_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_CAPACITY: i64 = 30;

/// A class section, optionally assigned to a teacher.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Class {
    pub id: i64,
    pub name: String,
    pub grade: String,
    pub section: String,
    pub teacher_id: Option<i64>,
    /// Joined from the assigned teacher
    pub teacher_name: Option<String>,
    pub room_number: Option<String>,
    pub capacity: i64,
    pub is_active: bool,
    /// Free-form schedule, typically a JSON string
    pub schedule: Option<String>,
    pub academic_year: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub grade: String,
    #[validate(length(min = 1, max = 10))]
    pub section: String,
    pub teacher_id: Option<i64>,
    #[validate(length(max = 10))]
    pub room_number: Option<String>,
    /// Defaults to 30
    #[validate(range(min = 1))]
    pub capacity: Option<i64>,
    pub schedule: Option<String>,
    #[validate(length(max = 10))]
    pub academic_year: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClassDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub grade: Option<String>,
    #[validate(length(min = 1, max = 10))]
    pub section: Option<String>,
    /// `null` unassigns the teacher
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<i64>)]
    pub teacher_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 10))]
    pub room_number: Option<Option<String>>,
    #[validate(range(min = 1))]
    pub capacity: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    pub schedule: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 10))]
    pub academic_year: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClassFilterParams {
    /// Case-insensitive match on name, section or room number
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub teacher_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub include_inactive: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedClassesResponse {
    pub data: Vec<Class>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_class_dto_rejects_zero_capacity() {
        let dto: CreateClassDto = serde_json::from_value(serde_json::json!({
            "name": "Physics",
            "grade": "10",
            "section": "A",
            "capacity": 0
        }))
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_class_dto_unassigns_teacher() {
        let dto: UpdateClassDto = serde_json::from_str(r#"{"teacher_id": null}"#).unwrap();
        assert_eq!(dto.teacher_id, Some(None));
        assert!(dto.capacity.is_none());
    }
}
