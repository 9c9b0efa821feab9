//! School event models and DTOs.

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
pub enum EventType {
    Academic,
    Sports,
    Cultural,
    Meeting,
    Holiday,
    Other,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub event_type: Option<EventType>,
    pub organizer_id: Option<i64>,
    pub organizer_name: Option<String>,
    pub is_public: bool,
    pub max_participants: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// `organizer_id` is taken from the caller.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEventDto {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    pub event_type: Option<EventType>,
    /// Defaults to true
    pub is_public: Option<bool>,
    #[validate(range(min = 1))]
    pub max_participants: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEventDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub event_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub end_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 200))]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<EventType>)]
    pub event_type: Option<Option<EventType>>,
    pub is_public: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<i64>)]
    #[validate(range(min = 1))]
    pub max_participants: Option<Option<i64>>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventFilterParams {
    /// Case-insensitive match on title, description or location
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    pub event_type: Option<EventType>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_public: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub include_inactive: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedEventsResponse {
    pub data: Vec<Event>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_event_dto_parses_dates() {
        let dto: CreateEventDto = serde_json::from_str(
            r#"{"title": "Science fair", "event_date": "2024-11-05T09:00:00Z", "event_type": "academic"}"#,
        )
        .unwrap();
        assert_eq!(dto.event_type, Some(EventType::Academic));
        assert!(dto.is_public.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_event_dto_rejects_zero_participants() {
        let dto: CreateEventDto = serde_json::from_str(
            r#"{"title": "Trip", "event_date": "2024-11-05T09:00:00Z", "max_participants": 0}"#,
        )
        .unwrap();
        assert!(dto.validate().is_err());
    }
}
