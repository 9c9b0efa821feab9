//! JWT utilities for authentication.
//!
//! Access tokens are HS256-signed and carry the user id, email and role. The
//! lifetime comes from [`JwtConfig::access_token_expiry`] (24 hours unless
//! `JWT_ACCESS_EXPIRY` overrides it).

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use emsu_config::JwtConfig;
use emsu_core::AppError;

use crate::claims::Claims;

/// Creates a signed access token for a user.
///
/// # Errors
///
/// Returns an internal error if encoding fails.
pub fn create_access_token(
    user_id: i64,
    email: &str,
    role: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies signature and expiry and returns the embedded claims.
///
/// # Errors
///
/// Returns 401 if the token is malformed, expired or signed with another key.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            access_token_expiry: 86_400,
        }
    }

    #[test]
    fn test_create_and_verify_access_token() {
        let config = config();
        let token = create_access_token(5, "teacher@school.com", "teacher", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.user_id().unwrap(), 5);
        assert_eq!(claims.email, "teacher@school.com");
        assert_eq!(claims.role, "teacher");
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn test_tokens_have_unique_ids() {
        let config = config();
        let a = create_access_token(1, "a@school.com", "admin", &config).unwrap();
        let b = create_access_token(1, "a@school.com", "admin", &config).unwrap();

        let a = verify_token(&a, &config).unwrap();
        let b = verify_token(&b, &config).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = create_access_token(1, "a@school.com", "admin", &config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            access_token_expiry: 86_400,
        };

        let err = verify_token(&token, &other).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let err = verify_token("not.a.token", &config()).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let config = config();
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "1".to_string(),
            email: "old@school.com".to_string(),
            role: "admin".to_string(),
            exp: now - 3600,
            iat: now - 7200,
            jti: "expired".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, &config).is_err());
    }
}
