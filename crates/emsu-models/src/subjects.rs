//! Subject catalogue models and DTOs.

use emsu_core::serde::{
    deserialize_nullable, deserialize_optional_bool, deserialize_optional_trimmed,
};
use emsu_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    /// Unique subject code, e.g. `MATH101`
    pub code: String,
    pub description: Option<String>,
    pub credits: i64,
    pub grade_level: Option<String>,
    pub department: Option<String>,
    pub is_mandatory: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSubjectDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    pub description: Option<String>,
    /// Defaults to 1
    #[validate(range(min = 0))]
    pub credits: Option<i64>,
    #[validate(length(max = 20))]
    pub grade_level: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    /// Defaults to true
    pub is_mandatory: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSubjectDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[validate(range(min = 0))]
    pub credits: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 20))]
    pub grade_level: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 100))]
    pub department: Option<Option<String>>,
    pub is_mandatory: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubjectFilterParams {
    /// Case-insensitive match on name, code or department
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub grade_level: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub include_inactive: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedSubjectsResponse {
    pub data: Vec<Subject>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_subject_dto_requires_code() {
        let dto: CreateSubjectDto =
            serde_json::from_str(r#"{"name": "Algebra", "code": ""}"#).unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("code"));
    }
}
