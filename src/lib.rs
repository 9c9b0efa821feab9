//! # EMSU API
//!
//! A REST API built with Rust, Axum, and SQLite for running a school's
//! day-to-day administration: staff accounts, students, teachers, classes,
//! subjects, attendance, grades, fees, announcements and events.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # Bearer-token extractor and role guards
//! ├── modules/          # Feature modules
//! │   ├── auth/        # Login, current user, profile, password change
//! │   ├── users/       # Staff accounts (admin only)
//! │   ├── students/    # Students and their grade/fee/attendance history
//! │   ├── teachers/
//! │   ├── classes/
//! │   ├── subjects/
//! │   ├── attendance/
//! │   ├── grades/
//! │   ├── fees/
//! │   ├── announcements/
//! │   ├── events/
//! │   └── dashboard/   # Aggregate counters
//! └── utils/           # Query-building helpers
//! ```
//!
//! Each feature module has the same shape:
//!
//! - `controller.rs`: HTTP handlers with their OpenAPI annotations
//! - `service.rs`: SQL and business rules
//! - `router.rs`: Axum router configuration
//!
//! Entities and DTOs live in the `emsu-models` crate.
//!
//! ## Roles
//!
//! | Role | Typical access |
//! |------|----------------|
//! | Admin | Everything, including staff accounts |
//! | Principal | All school records, soft-deletes |
//! | Teacher | Students, classes, attendance and grades |
//! | Accountant | Fees and the dashboard |
//! | Receptionist | Student and teacher registration |
//!
//! Every guarded request re-reads the user row, so deactivating an account
//! takes effect immediately even while its token is still valid.
//!
//! ## Records are never deleted
//!
//! `DELETE` marks a row `is_active = false`. List endpoints hide inactive
//! rows unless `include_inactive=true`; fetching by id still returns them.
//!
//! ## Quick Start
//!
//! ```bash
//! DATABASE_URL=sqlite://emsu.db
//! JWT_SECRET=your-secure-secret-key
//! JWT_ACCESS_EXPIRY=86400
//! PORT=5000
//! ```
//!
//! ```bash
//! cargo run --bin emsu-cli -- create-admin
//! cargo run
//! ```
//!
//! - Swagger UI: `http://localhost:5000/swagger-ui`
//! - Scalar: `http://localhost:5000/scalar`
//!
//! ## Modules
//!
//! - [`docs`]: OpenAPI documentation setup
//! - [`logging`]: Tracing subscriber and request logging
//! - [`metrics`]: Prometheus metrics endpoint
//! - [`middleware`]: Authentication and authorization
//! - [`modules`]: Feature modules
//! - [`router`]: Main application router
//! - [`state`]: Shared application state
//! - [`utils`]: Shared query helpers
//! - [`validator`]: Request validation

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;

// Re-export workspace crates for convenience
pub use emsu_auth;
pub use emsu_config;
pub use emsu_core;
pub use emsu_db;
pub use emsu_models;
