use anyhow::{Context, anyhow};
use chrono::Utc;
use emsu_auth::create_access_token;
use emsu_config::JwtConfig;
use emsu_core::{AppError, hash_password, verify_password};
use emsu_models::{ChangePasswordDto, LoginRequest, LoginResponse, UpdateProfileDto, User};
use sqlx::SqlitePool;
use tracing::instrument;

use crate::metrics::{track_jwt_issued, track_login_failure, track_login_success};
use crate::modules::users::service::UserService;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub struct AuthService;

impl AuthService {
    /// Verifies credentials and issues an access token.
    ///
    /// Unknown email, wrong password and inactive account all answer 401
    /// with the same message and leave the row untouched.
    #[instrument(skip(db, jwt_config, dto), fields(email = %dto.email))]
    pub async fn login(
        db: &SqlitePool,
        jwt_config: &JwtConfig,
        dto: LoginRequest,
    ) -> Result<LoginResponse, AppError> {
        let Some(user) = UserService::find_by_email(db, &dto.email).await? else {
            track_login_failure("unknown_email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &user.password_hash)? {
            track_login_failure("wrong_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        if !user.is_active {
            track_login_failure("inactive");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let access_token =
            create_access_token(user.id, &user.email, user.role.as_str(), jwt_config)?;
        track_jwt_issued();

        let now = Utc::now();
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(now)
            .bind(user.id)
            .execute(db)
            .await
            .context("Failed to record last login")
            .map_err(AppError::database)?;

        track_login_success(user.role.as_str());
        tracing::info!(user.id = user.id, "User logged in");

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
            user: User {
                last_login: Some(now),
                ..user
            },
        })
    }

    /// The token's user, provided it still exists and is active.
    #[instrument(skip(db))]
    pub async fn current_user(db: &SqlitePool, user_id: i64) -> Result<User, AppError> {
        UserService::find_user(db, user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    #[instrument(skip(db, user, dto), fields(user.id = user.id))]
    pub async fn update_profile(
        db: &SqlitePool,
        user: User,
        dto: UpdateProfileDto,
    ) -> Result<User, AppError> {
        sqlx::query(
            "UPDATE users SET first_name = ?, last_name = ?, phone = ?, profile_picture = ? \
             WHERE id = ?",
        )
        .bind(dto.first_name.unwrap_or(user.first_name))
        .bind(dto.last_name.unwrap_or(user.last_name))
        .bind(dto.phone.unwrap_or(user.phone))
        .bind(dto.profile_picture.unwrap_or(user.profile_picture))
        .bind(user.id)
        .execute(db)
        .await
        .context("Failed to update profile")
        .map_err(AppError::database)?;

        UserService::get_user(db, user.id).await
    }

    #[instrument(skip(db, user, dto), fields(user.id = user.id))]
    pub async fn change_password(
        db: &SqlitePool,
        user: &User,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        if !verify_password(&dto.current_password, &user.password_hash)? {
            return Err(AppError::unauthorized("Current password is incorrect"));
        }

        let password_hash = hash_password(&dto.new_password)?;

        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user.id)
            .execute(db)
            .await
            .context("Failed to change password")
            .map_err(AppError::database)?;

        Ok(())
    }
}
