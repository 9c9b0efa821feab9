//! User domain models and DTOs.
//!
//! Users are the staff accounts that log in to the API. Every guarded
//! endpoint resolves the caller to a [`User`] and checks its [`UserRole`].

use std::fmt;
use std::str::FromStr;

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

/// Staff role, stored as lowercase text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Principal,
    Teacher,
    Accountant,
    Receptionist,
}

impl UserRole {
    pub const ALL: [UserRole; 5] = [
        UserRole::Admin,
        UserRole::Principal,
        UserRole::Teacher,
        UserRole::Accountant,
        UserRole::Receptionist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Principal => "principal",
            UserRole::Teacher => "teacher",
            UserRole::Accountant => "accountant",
            UserRole::Receptionist => "receptionist",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown role: {}", s))
    }
}

/// A staff account.
///
/// `full_name` is computed by the select, never stored.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[serde(deserialize_with = "deserialize_trimmed")]
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1, max = 80))]
    pub first_name: String,
    #[validate(length(min = 1, max = 80))]
    pub last_name: String,
    pub role: UserRole,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 255))]
    pub profile_picture: Option<String>,
}

/// Partial update. Absent keys keep their value; `null` clears a nullable
/// column.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[serde(default, deserialize_with = "deserialize_trimmed_option")]
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 80))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 80))]
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 20))]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 255))]
    pub profile_picture: Option<Option<String>>,
    /// Reactivates (or deactivates) the account
    pub is_active: Option<bool>,
}

/// Query parameters for listing users.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilterParams {
    /// Case-insensitive match on first name, last name or email
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    pub role: Option<UserRole>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub include_inactive: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in UserRole::ALL {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("janitor".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&UserRole::Receptionist).unwrap();
        assert_eq!(json, r#""receptionist""#);
    }

    #[test]
    fn test_create_user_dto_validation() {
        let dto = CreateUserDto {
            email: "principal@school.com".to_string(),
            password: "password123".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            role: UserRole::Principal,
            phone: None,
            profile_picture: None,
        };
        assert!(dto.validate().is_ok());

        let bad = CreateUserDto {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            ..dto
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_padded_email_is_trimmed_before_validation() {
        let dto: CreateUserDto = serde_json::from_str(
            r#"{"email": "  Grace@School.com ", "password": "password123",
                "first_name": "Grace", "last_name": "Hopper", "role": "principal"}"#,
        )
        .unwrap();
        assert_eq!(dto.email, "Grace@School.com");
        assert!(dto.validate().is_ok());

        let update: UpdateUserDto =
            serde_json::from_str(r#"{"email": " a@school.com\n"}"#).unwrap();
        assert_eq!(update.email.as_deref(), Some("a@school.com"));
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_update_user_dto_null_clears_phone() {
        let dto: UpdateUserDto = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        assert_eq!(dto.phone, Some(None));
        assert!(dto.first_name.is_none());
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            email: "a@school.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            full_name: "Ada Lovelace".to_string(),
            role: UserRole::Admin,
            phone: None,
            profile_picture: None,
            last_login: None,
            is_active: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["full_name"], "Ada Lovelace");
        assert_eq!(json["role"], "admin");
    }
}
