//! # EMSU Core
//!
//! Core types, errors, and utilities shared by every EMSU crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Page-based pagination for list endpoints
//! - [`password`]: bcrypt password hashing and verification
//! - [`serde`]: Deserializers for loosely typed query-string values
//!
//! # Example
//!
//! ```ignore
//! use emsu_core::errors::AppError;
//! use emsu_core::pagination::PaginationParams;
//! use emsu_core::password::{hash_password, verify_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Student not found"));
//!
//! let hash = hash_password("secure_password")?;
//!
//! let params = PaginationParams::default();
//! let offset = params.offset();
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod serde;

pub use errors::{AppError, ErrorResponse};
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
