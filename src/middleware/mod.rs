//! Authentication and authorization for request handlers.
//!
//! - [`auth`]: the [`AuthUser`](auth::AuthUser) extractor validating the
//!   bearer token
//! - [`role`]: the role guard resolving the token to an active user and
//!   checking it against an allow-list
//!
//! # Flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. `AuthUser` verifies the signature and expiry (401 otherwise)
//! 3. A guard extractor such as `StudentsWrite` loads the user row and checks
//!    `is_active` and the role (403 otherwise)
//! 4. The handler runs with the resolved [`User`](emsu_models::User)
//!
//! ```ignore
//! use crate::middleware::role::StudentsWrite;
//!
//! async fn create_student(
//!     State(state): State<AppState>,
//!     StudentsWrite(user): StudentsWrite,
//!     ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
//! ) -> Result<(StatusCode, Json<Student>), AppError> {
//!     // only admins, principals and receptionists get here
//! }
//! ```

pub mod auth;
pub mod role;
