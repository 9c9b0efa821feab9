//! Announcement models and DTOs.

use chrono::{DateTime, Utc};
use emsu_core::serde::{
    deserialize_nullable, deserialize_optional_bool, deserialize_optional_trimmed,
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
pub enum TargetAudience {
    All,
    Students,
    Teachers,
    Parents,
    Staff,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub author_name: Option<String>,
    pub target_audience: TargetAudience,
    pub priority: Priority,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub attachment_url: Option<String>,
}

/// `author_id` is taken from the caller.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAnnouncementDto {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub target_audience: TargetAudience,
    /// Defaults to `normal`
    pub priority: Option<Priority>,
    pub expires_at: Option<DateTime<Utc>>,
    #[validate(length(max = 255))]
    pub attachment_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAnnouncementDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub target_audience: Option<TargetAudience>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 255))]
    pub attachment_url: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnnouncementFilterParams {
    /// Case-insensitive match on title or content
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    pub target_audience: Option<TargetAudience>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub include_inactive: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedAnnouncementsResponse {
    pub data: Vec<Announcement>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_defaults_to_normal() {
        let dto: CreateAnnouncementDto = serde_json::from_str(
            r#"{"title": "Sports day", "content": "Friday", "target_audience": "all"}"#,
        )
        .unwrap();
        assert_eq!(dto.priority.unwrap_or_default(), Priority::Normal);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_unknown_audience_is_rejected() {
        let result: Result<CreateAnnouncementDto, _> = serde_json::from_str(
            r#"{"title": "x", "content": "y", "target_audience": "aliens"}"#,
        );
        assert!(result.is_err());
    }
}
