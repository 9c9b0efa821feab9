//! Admin account bootstrap.
//!
//! The API never lets an unauthenticated caller create accounts, so the
//! first admin has to come from here.

use anyhow::{Context, bail};
use emsu_core::hash_password;
use emsu_models::UserRole;
use sqlx::SqlitePool;

pub struct NewAdmin<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Inserts an active admin and returns its id.
pub async fn create_admin(db: &SqlitePool, admin: NewAdmin<'_>) -> anyhow::Result<i64> {
    let email = admin.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        bail!("Invalid email address");
    }
    if admin.password.len() < MIN_PASSWORD_LENGTH {
        bail!("Password must be at least {MIN_PASSWORD_LENGTH} characters");
    }

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(&email)
        .fetch_one(db)
        .await
        .context("Failed to check for an existing user")?;
    if existing > 0 {
        bail!("User with this email already exists");
    }

    let password_hash = hash_password(admin.password).map_err(|e| e.error)?;

    let result = sqlx::query(
        "INSERT INTO users (email, password_hash, first_name, last_name, role) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&email)
    .bind(&password_hash)
    .bind(admin.first_name.trim())
    .bind(admin.last_name.trim())
    .bind(UserRole::Admin)
    .execute(db)
    .await
    .context("Failed to insert admin")?;

    Ok(result.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin<'a>(email: &'a str, password: &'a str) -> NewAdmin<'a> {
        NewAdmin {
            first_name: "Ada",
            last_name: "Admin",
            email,
            password,
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn creates_admin_with_normalized_email(pool: SqlitePool) {
        let id = create_admin(&pool, admin("  Head@School.COM ", "secret123"))
            .await
            .unwrap();

        let (email, role): (String, String) =
            sqlx::query_as("SELECT email, role FROM users WHERE id = ?")
                .bind(id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(email, "head@school.com");
        assert_eq!(role, "admin");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn rejects_duplicate_email(pool: SqlitePool) {
        create_admin(&pool, admin("head@school.com", "secret123"))
            .await
            .unwrap();
        let err = create_admin(&pool, admin("HEAD@school.com", "secret123"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn rejects_short_password(pool: SqlitePool) {
        let err = create_admin(&pool, admin("head@school.com", "abc"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("at least"));
    }
}
