//! Database layer: connection pooling and migrations.
//!
//! - [`pool`]: PostgreSQL connection pool with health checks
//! - [`migrations`]: embedded SQL migration runner
//!
//! Models live in the crate-root `models` module.

pub mod migrations;
pub mod pool;
