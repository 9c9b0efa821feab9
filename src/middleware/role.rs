//! Role guard.
//!
//! Every guarded endpoint declares the roles it admits. A request passes only
//! if its token resolves to a stored, active [`User`] whose role is in that
//! allow-list; otherwise it is answered with 403 `Access denied` before the
//! handler runs.
//!
//! Two ways to apply it:
//!
//! - extractor types declared with `require_roles!` (one per allow-list in
//!   [`policy`]), placed before the body extractor so denial happens before
//!   any payload is read
//! - the [`require_roles`] / [`require_admin`] layer functions for guarding a
//!   whole router

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use emsu_core::AppError;
use emsu_models::{User, UserRole};
use sqlx::SqlitePool;

use crate::metrics::track_authorization_check;
use crate::middleware::auth::AuthUser;
use crate::modules::users::service::UserService;
use crate::state::AppState;

pub const ACCESS_DENIED: &str = "Access denied";

/// Allow-lists per resource and action.
pub mod policy {
    use emsu_models::UserRole::{self, Accountant, Admin, Principal, Receptionist, Teacher};

    pub const ADMIN: &[UserRole] = &[Admin];
    pub const MANAGEMENT: &[UserRole] = &[Admin, Principal];
    pub const ANY_ROLE: &[UserRole] = &UserRole::ALL;

    pub const STUDENTS_READ: &[UserRole] = &[Admin, Principal, Teacher, Receptionist];
    pub const STUDENTS_WRITE: &[UserRole] = &[Admin, Principal, Receptionist];

    pub const TEACHERS_READ: &[UserRole] = &[Admin, Principal, Receptionist];

    pub const CLASSES_READ: &[UserRole] = &[Admin, Principal, Teacher, Receptionist];

    /// Attendance and grades, read and write.
    pub const ACADEMIC: &[UserRole] = &[Admin, Principal, Teacher];

    pub const FEES_READ: &[UserRole] = &[Admin, Principal, Accountant];
    pub const FEES_WRITE: &[UserRole] = &[Admin, Accountant];

    pub const DASHBOARD: &[UserRole] = &[Admin, Principal, Accountant];
}

/// The authorization predicate.
///
/// `None` (identity did not resolve), an inactive user, or a role outside
/// `allowed` are all denied with the same message.
pub fn authorize(user: Option<User>, allowed: &[UserRole]) -> Result<User, AppError> {
    match user {
        Some(user) if user.is_active && allowed.contains(&user.role) => Ok(user),
        _ => Err(AppError::forbidden(ACCESS_DENIED)),
    }
}

pub struct Guard;

impl Guard {
    /// Loads the token's user and applies [`authorize`].
    pub async fn resolve(
        db: &SqlitePool,
        auth_user: &AuthUser,
        allowed: &[UserRole],
    ) -> Result<User, AppError> {
        let user_id = auth_user.user_id()?;
        let user = UserService::find_user(db, user_id).await?;
        let role = user.as_ref().map(|u| u.role.as_str()).unwrap_or("unknown");

        match authorize(user.clone(), allowed) {
            Ok(user) => {
                track_authorization_check(true, role);
                Ok(user)
            }
            Err(err) => {
                tracing::warn!(
                    user.id = user_id,
                    user.role = role,
                    user.active = user.as_ref().map(|u| u.is_active),
                    "Authorization denied"
                );
                track_authorization_check(false, role);
                Err(err)
            }
        }
    }
}

macro_rules! require_roles {
    ($(#[$meta:meta])* $name:ident, $allowed:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub User);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = AuthUser::from_request_parts(parts, state).await?;
                Guard::resolve(&state.db, &auth_user, $allowed)
                    .await
                    .map($name)
            }
        }
    };
}

require_roles!(
    /// Any active user, whatever the role.
    ActiveUser,
    policy::ANY_ROLE
);
require_roles!(
    /// Admin and principal.
    Management,
    policy::MANAGEMENT
);
require_roles!(StudentsRead, policy::STUDENTS_READ);
require_roles!(StudentsWrite, policy::STUDENTS_WRITE);
require_roles!(TeachersRead, policy::TEACHERS_READ);
require_roles!(ClassesRead, policy::CLASSES_READ);
require_roles!(
    /// Attendance and grades.
    AcademicStaff,
    policy::ACADEMIC
);
require_roles!(FeesRead, policy::FEES_READ);
require_roles!(FeesWrite, policy::FEES_WRITE);
require_roles!(DashboardRead, policy::DASHBOARD);

/// Layer function guarding every route of a router.
///
/// ```rust,ignore
/// Router::new()
///     .route("/", get(list))
///     .route_layer(middleware::from_fn_with_state(state.clone(), |state, req, next| {
///         require_roles(state, req, next, policy::MANAGEMENT)
///     }));
/// ```
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed: &'static [UserRole],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    let user = Guard::resolve(&state.db, &auth_user, allowed).await?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Admin-only routers (`/api/users`).
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(State(state), req, next, policy::ADMIN).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: UserRole, is_active: bool) -> User {
        User {
            id: 1,
            email: "staff@school.com".to_string(),
            password_hash: String::new(),
            first_name: "Sam".to_string(),
            last_name: "Staff".to_string(),
            full_name: "Sam Staff".to_string(),
            role,
            phone: None,
            profile_picture: None,
            last_login: None,
            is_active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_authorize_allows_listed_role() {
        let result = authorize(Some(user(UserRole::Principal, true)), policy::MANAGEMENT);
        assert_eq!(result.unwrap().role, UserRole::Principal);
    }

    #[test]
    fn test_authorize_denies_unlisted_role() {
        let err = authorize(Some(user(UserRole::Teacher, true)), policy::MANAGEMENT).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
        assert_eq!(err.public_message(), ACCESS_DENIED);
    }

    #[test]
    fn test_authorize_denies_inactive_user() {
        let err = authorize(Some(user(UserRole::Admin, false)), policy::ADMIN).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
    }

    #[test]
    fn test_authorize_denies_missing_user() {
        let err = authorize(None, policy::ANY_ROLE).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
    }

    #[test]
    fn test_policy_table() {
        use UserRole::*;

        assert!(policy::STUDENTS_READ.contains(&Teacher));
        assert!(!policy::STUDENTS_WRITE.contains(&Teacher));
        assert!(policy::STUDENTS_WRITE.contains(&Receptionist));
        assert!(!policy::TEACHERS_READ.contains(&Teacher));
        assert!(!policy::ACADEMIC.contains(&Accountant));
        assert!(policy::FEES_WRITE.contains(&Accountant));
        assert!(!policy::FEES_WRITE.contains(&Principal));
        assert!(policy::FEES_READ.contains(&Principal));
        assert!(!policy::DASHBOARD.contains(&Teacher));
        assert_eq!(policy::ANY_ROLE.len(), 5);
    }
}
