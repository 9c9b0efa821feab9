use anyhow::{Context, anyhow};
use emsu_core::{AppError, PaginationMeta, hash_password};
use emsu_models::{
    CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserFilterParams,
};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::instrument;

use crate::utils::query::{
    map_write_error, push_active_filter, push_page, push_search, value_taken,
};

const USER_SELECT: &str = "SELECT id, email, password_hash, first_name, last_name, \
     first_name || ' ' || last_name AS full_name, role, phone, profile_picture, \
     last_login, is_active, created_at FROM users";

const EMAIL_TAKEN: &str = "Email already exists";

/// Emails are compared and stored trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct UserService;

impl UserService {
    /// Loads a user by id without treating absence as an error.
    pub async fn find_user<'e, E>(db: E, id: i64) -> Result<Option<User>, AppError>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch user")
            .map_err(AppError::database)
    }

    pub async fn find_by_email<'e, E>(db: E, email: &str) -> Result<Option<User>, AppError>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE email = ?"))
            .bind(normalize_email(email))
            .fetch_optional(db)
            .await
            .context("Failed to fetch user by email")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_user(db: &SqlitePool, id: i64) -> Result<User, AppError> {
        Self::find_user(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, params: &UserFilterParams) {
        push_active_filter(qb, "is_active", params.include_inactive);
        if let Some(search) = &params.search {
            push_search(qb, &["first_name", "last_name", "email"], search);
        }
        if let Some(role) = params.role {
            qb.push(" AND role = ").push_bind(role);
        }
    }

    #[instrument(skip(db))]
    pub async fn list_users(
        db: &SqlitePool,
        params: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users WHERE 1=1");
        Self::push_filters(&mut count_query, &params);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(db)
            .await
            .context("Failed to count users")
            .map_err(AppError::database)?;

        let mut query = QueryBuilder::<Sqlite>::new(USER_SELECT);
        query.push(" WHERE 1=1");
        Self::push_filters(&mut query, &params);
        query.push(" ORDER BY last_name, first_name, id");
        push_page(&mut query, &params.pagination);

        let users = query
            .build_query_as::<User>()
            .fetch_all(db)
            .await
            .context("Failed to fetch users")
            .map_err(AppError::database)?;

        Ok(PaginatedUsersResponse {
            data: users,
            meta: PaginationMeta::new(&params.pagination, total),
        })
    }

    #[instrument(skip(db, dto), fields(email = %dto.email, role = %dto.role))]
    pub async fn create_user(db: &SqlitePool, dto: CreateUserDto) -> Result<User, AppError> {
        let email = normalize_email(&dto.email);
        let password_hash = hash_password(&dto.password)?;

        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        if value_taken(&mut *tx, "users", "email", &email, None).await? {
            return Err(AppError::bad_request(anyhow!(EMAIL_TAKEN)));
        }

        let id = sqlx::query(
            "INSERT INTO users \
             (email, password_hash, first_name, last_name, role, phone, profile_picture) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(dto.role)
        .bind(&dto.phone)
        .bind(&dto.profile_picture)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, EMAIL_TAKEN))?
        .last_insert_rowid();

        let user = Self::find_user(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::internal_error("Created user could not be read back"))?;

        tx.commit().await.context("Failed to commit user")?;

        Ok(user)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_user(
        db: &SqlitePool,
        id: i64,
        dto: UpdateUserDto,
    ) -> Result<User, AppError> {
        let mut tx = db.begin().await.context("Failed to begin transaction")?;

        let existing = Self::find_user(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        let email = match dto.email {
            Some(email) => {
                let email = normalize_email(&email);
                if value_taken(&mut *tx, "users", "email", &email, Some(id)).await? {
                    return Err(AppError::bad_request(anyhow!(EMAIL_TAKEN)));
                }
                email
            }
            None => existing.email,
        };
        let password_hash = match dto.password {
            Some(password) => hash_password(&password)?,
            None => existing.password_hash,
        };

        sqlx::query(
            "UPDATE users SET email = ?, password_hash = ?, first_name = ?, last_name = ?, \
             role = ?, phone = ?, profile_picture = ?, is_active = ? WHERE id = ?",
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(dto.first_name.unwrap_or(existing.first_name))
        .bind(dto.last_name.unwrap_or(existing.last_name))
        .bind(dto.role.unwrap_or(existing.role))
        .bind(dto.phone.unwrap_or(existing.phone))
        .bind(dto.profile_picture.unwrap_or(existing.profile_picture))
        .bind(dto.is_active.unwrap_or(existing.is_active))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, EMAIL_TAKEN))?;

        let user = Self::find_user(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        tx.commit().await.context("Failed to commit user")?;

        Ok(user)
    }

    /// Soft delete. Repeating it on an inactive user is a no-op.
    #[instrument(skip(db))]
    pub async fn deactivate_user(db: &SqlitePool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to deactivate user")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("User not found")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane.Doe@School.COM "), "jane.doe@school.com");
    }
}
