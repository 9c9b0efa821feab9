//! Helpers shared by the entity services.

pub mod query;
