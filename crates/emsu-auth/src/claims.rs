//! JWT claim structure for access tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use emsu_core::AppError;

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    /// User's email address at issue time
    pub email: String,
    /// User's role at issue time
    pub role: String,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
    /// Unique token identifier
    pub jti: String,
}

impl Claims {
    /// Parses the numeric user id out of `sub`.
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid token subject"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            email: "test@example.com".to_string(),
            role: "teacher".to_string(),
            exp: 1234567890,
            iat: 1234567800,
            jti: "test-jti".to_string(),
        }
    }

    #[test]
    fn test_claims_serialize() {
        let serialized = serde_json::to_string(&sample("7")).unwrap();
        assert!(serialized.contains(r#""sub":"7""#));
        assert!(serialized.contains(r#""role":"teacher""#));
    }

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"sub":"12","email":"user@test.com","role":"admin","exp":9999999999,"iat":9999999900,"jti":"abc"}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "12");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp, 9999999999);
    }

    #[test]
    fn test_user_id_parses_subject() {
        assert_eq!(sample("42").user_id().unwrap(), 42);
    }

    #[test]
    fn test_user_id_rejects_non_numeric_subject() {
        let err = sample("not-a-number").user_id().unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }
}
