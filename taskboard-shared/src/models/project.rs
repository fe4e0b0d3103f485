//! Project model and database operations.
//!
//! A project is owned by the admin who created it and carries its member
//! list inline as a UUID array. The owner is always part of the member
//! list; [`crate::auth::authorization::resolve_members`] enforces that
//! before any insert or update touches the column.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE projects (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(255) NOT NULL,
//!     description TEXT,
//!     owner_id UUID NOT NULL REFERENCES users(id),
//!     members UUID[] NOT NULL DEFAULT '{}',
//!     status project_status NOT NULL DEFAULT 'active',
//!     start_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     end_date TIMESTAMPTZ,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::UserRef;

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    /// Work in progress
    Active,

    /// Delivered; kept visible
    Completed,

    /// Hidden from day-to-day views
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Archived => "archived",
        }
    }
}

/// Project record.
///
/// `owner_id` is immutable after creation. `members` always contains the
/// owner.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID (UUID v4)
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// User who created the project; immutable
    pub owner_id: Uuid,

    /// Users with access to the project (always includes the owner)
    pub members: Vec<Uuid>,

    /// Lifecycle status
    pub status: ProjectStatus,

    /// When work starts (defaults to creation time)
    pub start_date: DateTime<Utc>,

    /// Optional target end date
    pub end_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Whether the given user may view this project and its tasks.
    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.members.contains(&user_id)
    }
}

/// Input for creating a new project.
///
/// `members` must already include the owner (see
/// [`crate::auth::authorization::resolve_members`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub members: Vec<Uuid>,

    /// Defaults to `NOW()` when omitted
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Input for a partial project update.
///
/// Only non-None fields are written. The caller is responsible for
/// re-including the owner in `members`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub members: Option<Vec<Uuid>>,
}

/// Project with its owner reference resolved, as returned by listings.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithOwner {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner: UserRef,
    pub members: Vec<Uuid>,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat join row backing [`ProjectWithOwner`].
#[derive(Debug, sqlx::FromRow)]
struct ProjectOwnerRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    owner_id: Uuid,
    members: Vec<Uuid>,
    status: ProjectStatus,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_name: String,
    owner_email: String,
    owner_avatar_url: Option<String>,
}

impl From<ProjectOwnerRow> for ProjectWithOwner {
    fn from(row: ProjectOwnerRow) -> Self {
        ProjectWithOwner {
            id: row.id,
            name: row.name,
            description: row.description,
            owner: UserRef {
                id: row.owner_id,
                name: row.owner_name,
                email: row.owner_email,
                avatar_url: row.owner_avatar_url,
            },
            members: row.members,
            status: row.status,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Project {
    /// Creates a new project.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner reference is invalid (foreign key
    /// violation) or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, owner_id, members, start_date, end_date)
            VALUES ($1, $2, $3, $4, COALESCE($5, NOW()), $6)
            RETURNING id, name, description, owner_id, members, status,
                      start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.owner_id)
        .bind(data.members)
        .bind(data.start_date)
        .bind(data.end_date)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, owner_id, members, status,
                   start_date, end_date, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists projects where the given user is a member, oldest first, with
    /// the owner reference resolved.
    pub async fn list_for_member(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ProjectWithOwner>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ProjectOwnerRow>(
            r#"
            SELECT p.id, p.name, p.description, p.owner_id, p.members, p.status,
                   p.start_date, p.end_date, p.created_at, p.updated_at,
                   u.name AS owner_name, u.email AS owner_email,
                   u.avatar_url AS owner_avatar_url
            FROM projects p
            JOIN users u ON u.id = p.owner_id
            WHERE $1 = ANY(p.members)
            ORDER BY p.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(ProjectWithOwner::from).collect())
    }

    /// Applies a partial update and returns the updated project, or `None`
    /// if the project doesn't exist. `updated_at` is always bumped.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.start_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", start_date = ${}", bind_count));
        }
        if data.end_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", end_date = ${}", bind_count));
        }
        if data.members.is_some() {
            bind_count += 1;
            query.push_str(&format!(", members = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, description, owner_id, members, status, \
             start_date, end_date, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(start_date) = data.start_date {
            q = q.bind(start_date);
        }
        if let Some(end_date) = data.end_date {
            q = q.bind(end_date);
        }
        if let Some(members) = data.members {
            q = q.bind(members);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Deletes a project.
    ///
    /// Callers are expected to delete the project's tasks first (see
    /// [`crate::models::task::Task::delete_by_project`]); the two
    /// statements run sequentially, not in a transaction.
    ///
    /// Returns true if the project existed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
