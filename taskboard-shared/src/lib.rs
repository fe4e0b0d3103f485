//! # Taskboard Shared Library
//!
//! Shared types and business logic for the taskboard API server:
//!
//! - `models`: database models (users, projects, tasks)
//! - `auth`: password hashing, JWT tokens, the request [`Actor`], and the
//!   authorization gate
//! - `db`: connection pooling and migrations
//!
//! [`Actor`]: auth::middleware::Actor

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
