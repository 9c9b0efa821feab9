//! # EMSU CLI
//!
//! Administrative tools for EMSU: bootstrapping the first admin account and
//! filling a development database with fake school records.
//!
//! ## Usage
//!
//! ```ignore
//! use emsu_cli::seeder::{SeedConfig, seed_all};
//!
//! let config = SeedConfig::default().with_students(200);
//! seed_all(&pool, &config).await?;
//! ```

pub mod admin;
pub mod seeder;
