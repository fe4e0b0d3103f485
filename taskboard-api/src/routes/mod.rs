//! API route handlers, organized by resource:
//!
//! - `health`: health check endpoint
//! - `auth`: registration, login, token refresh
//! - `projects`: project registry and board view
//! - `tasks`: task creation, listing, and board moves
//! - `users`: directory listing and role changes
//! - `profile`: self-service profile updates

pub mod auth;
pub mod health;
pub mod profile;
pub mod projects;
pub mod tasks;
pub mod users;
