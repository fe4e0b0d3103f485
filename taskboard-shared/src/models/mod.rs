//! Database models for the taskboard service.
//!
//! Each model owns its CRUD operations against the shared `PgPool`:
//!
//! - `user`: accounts, directory roles, authentication type
//! - `project`: projects with inline member lists
//! - `task`: Kanban tasks linked to a project and an optional assignee

pub mod project;
pub mod task;
pub mod user;
