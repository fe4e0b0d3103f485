//! Task model and database operations.
//!
//! Tasks belong to exactly one project and optionally carry an assignee.
//! Status transitions are deliberately unconstrained: any status can be
//! set from any other, subject to authorization. A status change bumps
//! `updated_at` and nothing else.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     title VARCHAR(255) NOT NULL,
//!     description TEXT,
//!     status task_status NOT NULL DEFAULT 'todo',
//!     priority task_priority NOT NULL DEFAULT 'medium',
//!     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
//!     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
//!     created_by UUID NOT NULL REFERENCES users(id),
//!     due_date TIMESTAMPTZ,
//!     tags TEXT[] NOT NULL DEFAULT '{}',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Kanban status of a task.
///
/// The board renders three lanes (todo, in-progress, done); `backlog`
/// tasks are grouped into the todo lane in board and list displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not yet scheduled; shown in the todo lane
    Backlog,

    /// Ready to pick up
    #[default]
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Backlog => "backlog",
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }

    /// The board lane this status is displayed in.
    ///
    /// Backlog folds into the todo lane; the other statuses map to
    /// themselves.
    pub fn board_lane(&self) -> TaskStatus {
        match self {
            TaskStatus::Backlog => TaskStatus::Todo,
            other => *other,
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,

    #[default]
    Medium,

    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Task record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Short title
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Kanban status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Owning project; immutable after creation
    pub project_id: Uuid,

    /// User responsible for completion, if any
    pub assignee_id: Option<Uuid>,

    /// User who created the task
    pub created_by: Uuid,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Free-form labels
    pub tags: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task.
///
/// The assignee must already be resolved (see
/// [`crate::auth::authorization::resolve_assignee`]): it defaults to the
/// creator, and only admins may point it at someone else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,

    pub project_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub created_by: Uuid,
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Input for a partial task update.
///
/// Covers exactly the fields a board interaction can touch: status,
/// priority, title, and description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Assignee reference on a resolved task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssigneeRef {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Project reference on a resolved task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: Uuid,
    pub name: String,
}

/// Task with its assignee and project references resolved, as returned by
/// listings.
#[derive(Debug, Clone, Serialize)]
pub struct TaskWithRefs {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub project: ProjectRef,
    pub assignee: Option<AssigneeRef>,
    pub created_by: Uuid,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat join row backing [`TaskWithRefs`].
#[derive(Debug, sqlx::FromRow)]
struct TaskRefsRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    project_id: Uuid,
    assignee_id: Option<Uuid>,
    created_by: Uuid,
    due_date: Option<DateTime<Utc>>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    project_name: String,
    assignee_name: Option<String>,
    assignee_avatar_url: Option<String>,
}

impl From<TaskRefsRow> for TaskWithRefs {
    fn from(row: TaskRefsRow) -> Self {
        let assignee = match (row.assignee_id, row.assignee_name) {
            (Some(id), Some(name)) => Some(AssigneeRef {
                id,
                name,
                avatar_url: row.assignee_avatar_url,
            }),
            _ => None,
        };

        TaskWithRefs {
            id: row.id,
            title: row.title,
            description: row.description,
            status: row.status,
            priority: row.priority,
            project: ProjectRef {
                id: row.project_id,
                name: row.project_name,
            },
            assignee,
            created_by: row.created_by,
            due_date: row.due_date,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const TASK_REFS_SELECT: &str = r#"
    SELECT t.id, t.title, t.description, t.status, t.priority, t.project_id,
           t.assignee_id, t.created_by, t.due_date, t.tags, t.created_at, t.updated_at,
           p.name AS project_name,
           u.name AS assignee_name, u.avatar_url AS assignee_avatar_url
    FROM tasks t
    JOIN projects p ON p.id = t.project_id
    LEFT JOIN users u ON u.id = t.assignee_id
"#;

impl Task {
    /// Creates a new task.
    ///
    /// # Errors
    ///
    /// Returns an error if the project or user references are invalid
    /// (foreign key violation) or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, priority, project_id,
                               assignee_id, created_by, due_date, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, title, description, status, priority, project_id,
                      assignee_id, created_by, due_date, tags, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.project_id)
        .bind(data.assignee_id)
        .bind(data.created_by)
        .bind(data.due_date)
        .bind(data.tags)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, priority, project_id,
                   assignee_id, created_by, due_date, tags, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID with references resolved.
    pub async fn find_with_refs(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<TaskWithRefs>, sqlx::Error> {
        let query = format!("{TASK_REFS_SELECT} WHERE t.id = $1");

        let row = sqlx::query_as::<_, TaskRefsRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(TaskWithRefs::from))
    }

    /// Lists a project's tasks, newest first, with references resolved.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<TaskWithRefs>, sqlx::Error> {
        let query = format!("{TASK_REFS_SELECT} WHERE t.project_id = $1 ORDER BY t.created_at DESC");

        let rows = sqlx::query_as::<_, TaskRefsRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(TaskWithRefs::from).collect())
    }

    /// Lists the tasks assigned to a user, newest first, with references
    /// resolved.
    pub async fn list_by_assignee(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<TaskWithRefs>, sqlx::Error> {
        let query =
            format!("{TASK_REFS_SELECT} WHERE t.assignee_id = $1 ORDER BY t.created_at DESC");

        let rows = sqlx::query_as::<_, TaskRefsRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(TaskWithRefs::from).collect())
    }

    /// Applies a partial update and returns the updated task, or `None` if
    /// the task doesn't exist. `updated_at` is always bumped; a status
    /// overwrite has no other side effect.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, status, priority, project_id, \
             assignee_id, created_by, due_date, tags, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes every task belonging to a project and returns how many rows
    /// were removed.
    ///
    /// Runs as the first half of a project cascade delete; the project row
    /// itself is removed by a separate statement afterwards.
    pub async fn delete_by_project(pool: &PgPool, project_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Backlog.as_str(), "backlog");
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_status_wire_name_is_kebab_case() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            r#""in-progress""#
        );
        assert_eq!(
            serde_json::from_str::<TaskStatus>(r#""in-progress""#).unwrap(),
            TaskStatus::InProgress
        );
    }

    #[test]
    fn test_board_lane_folds_backlog_into_todo() {
        assert_eq!(TaskStatus::Backlog.board_lane(), TaskStatus::Todo);
        assert_eq!(TaskStatus::Todo.board_lane(), TaskStatus::Todo);
        assert_eq!(TaskStatus::InProgress.board_lane(), TaskStatus::InProgress);
        assert_eq!(TaskStatus::Done.board_lane(), TaskStatus::Done);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TaskStatus::default(), TaskStatus::Todo);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_create_task_serde_defaults() {
        let json = r#"{
            "title": "Write docs",
            "project_id": "550e8400-e29b-41d4-a716-446655440000",
            "created_by": "550e8400-e29b-41d4-a716-446655440001"
        }"#;

        let create: CreateTask = serde_json::from_str(json).unwrap();
        assert_eq!(create.status, TaskStatus::Todo);
        assert_eq!(create.priority, TaskPriority::Medium);
        assert!(create.tags.is_empty());
        assert!(create.assignee_id.is_none());
    }

    #[test]
    fn test_task_with_refs_resolves_assignee_only_when_present() {
        let project_id = Uuid::new_v4();
        let row = TaskRefsRow {
            id: Uuid::new_v4(),
            title: "T".to_string(),
            description: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            project_id,
            assignee_id: None,
            created_by: Uuid::new_v4(),
            due_date: None,
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
            project_name: "Alpha".to_string(),
            assignee_name: None,
            assignee_avatar_url: None,
        };

        let resolved = TaskWithRefs::from(row);
        assert!(resolved.assignee.is_none());
        assert_eq!(resolved.project.id, project_id);
        assert_eq!(resolved.project.name, "Alpha");
    }
}
