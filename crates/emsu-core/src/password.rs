//! bcrypt hashing for staff passwords. Only the hash is ever stored.

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

/// Hashes `password` with a fresh salt at the default bcrypt cost.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))
}

/// `Ok(false)` on a mismatch; `Err` only when `hash` is not a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal_error(format!("Failed to verify password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies_only_the_original_password() {
        let hashed = hash_password("welcome123").unwrap();

        assert_ne!(hashed, "welcome123");
        assert!(verify_password("welcome123", &hashed).unwrap());
        assert!(!verify_password("welcome124", &hashed).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let first = hash_password("welcome123").unwrap();
        let second = hash_password("welcome123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("welcome123", "not-a-bcrypt-hash").is_err());
    }
}
