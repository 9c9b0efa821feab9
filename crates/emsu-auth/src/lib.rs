//! # EMSU Auth
//!
//! Access token claims and JWT utilities for the EMSU API.
//!
//! - [`claims`]: the claim set carried by access tokens
//! - [`jwt`]: token creation and verification
//!
//! Tokens identify a user; they are not trusted for authorization on their
//! own. Role checks always resolve the user row so a deactivated account or a
//! changed role takes effect before the token expires.
//!
//! # Example
//!
//! ```ignore
//! use emsu_auth::{create_access_token, verify_token};
//! use emsu_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(42, "admin@school.com", "admin", &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.user_id()?, 42);
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
