//! Task board endpoints.
//!
//! Any authenticated actor may create a task; the assignee defaults to
//! the creator and only admins can hand a task to someone else. Edits
//! (status, priority, title, description) are limited to the assignee and
//! admins. Status transitions are unconstrained: drag-to-column maps to a
//! plain status overwrite.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use taskboard_shared::{
    auth::{
        authorization::{require_project_member, require_task_editor, resolve_assignee},
        middleware::Actor,
    },
    models::{
        project::Project,
        task::{CreateTask, Task, TaskPriority, TaskStatus, TaskWithRefs, UpdateTask},
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    /// Owning project
    pub project_id: Uuid,

    pub description: Option<String>,

    /// Defaults to `todo`
    pub status: Option<TaskStatus>,

    /// Defaults to `medium`
    pub priority: Option<TaskPriority>,

    /// Defaults to the actor; assigning others requires admin
    pub assignee_id: Option<Uuid>,

    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Update task request (partial merge)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,

    pub description: Option<String>,
}

/// Task list filter
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Restrict to one project (member-only); otherwise the actor's
    /// assigned tasks are returned
    pub project_id: Option<Uuid>,
}

/// Creates a new task.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `403 Forbidden`: non-admin tried to assign someone else
/// - `404 Not Found`: project or assignee doesn't exist
pub async fn create_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskWithRefs>)> {
    req.validate()?;

    if Project::find_by_id(&state.db, req.project_id).await?.is_none() {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    let assignee_id = resolve_assignee(&actor, req.assignee_id)?;

    if assignee_id != actor.id && !User::exists(&state.db, assignee_id).await? {
        return Err(ApiError::NotFound("Assignee not found".to_string()));
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or_default(),
            priority: req.priority.unwrap_or_default(),
            project_id: req.project_id,
            assignee_id: Some(assignee_id),
            created_by: actor.id,
            due_date: req.due_date,
            tags: req.tags,
        },
    )
    .await?;

    let resolved = Task::find_with_refs(&state.db, task.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Created task not found".to_string()))?;

    Ok((StatusCode::CREATED, Json(resolved)))
}

/// Lists tasks.
///
/// With `project_id`, returns that project's tasks (members only);
/// without it, returns the tasks assigned to the actor. Newest first,
/// references resolved.
///
/// # Errors
///
/// - `403 Forbidden`: actor is not a member of the requested project
/// - `404 Not Found`: requested project doesn't exist
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<TaskWithRefs>>> {
    let tasks = match query.project_id {
        Some(project_id) => {
            let project = Project::find_by_id(&state.db, project_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

            require_project_member(&actor, &project)?;

            Task::list_by_project(&state.db, project_id).await?
        }
        None => Task::list_by_assignee(&state.db, actor.id).await?,
    };

    Ok(Json(tasks))
}

/// Applies a partial update to a task.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `403 Forbidden`: actor is neither the assignee nor an admin
/// - `404 Not Found`: task doesn't exist
pub async fn update_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let existing = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_task_editor(&actor, existing.assignee_id)?;

    let task = Task::update(
        &state.db,
        task_id,
        UpdateTask {
            status: req.status,
            priority: req.priority,
            title: req.title,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}
