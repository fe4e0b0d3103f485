//! Project registry endpoints.
//!
//! Projects are created, edited, and deleted by admins only; every member
//! of a project can list it and view its board. Member-set writes always
//! go through [`resolve_members`] so the owner can never fall out of
//! their own project.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{
        authorization::{require_admin, require_project_member, resolve_members},
        middleware::Actor,
    },
    models::{
        project::{CreateProject, Project, ProjectStatus, ProjectWithOwner, UpdateProject},
        task::{Task, TaskStatus, TaskWithRefs},
        user::{User, UserRef},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, message = "Project name is required"))]
    pub name: String,

    pub description: Option<String>,

    /// Defaults to the current time
    pub start_date: Option<DateTime<Utc>>,

    pub end_date: Option<DateTime<Utc>>,

    /// Initial member set; the creator is always added
    #[serde(default)]
    pub members: Vec<Uuid>,
}

/// Update project request (partial merge)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, message = "Project name is required"))]
    pub name: Option<String>,

    pub description: Option<String>,

    pub status: Option<ProjectStatus>,

    pub start_date: Option<DateTime<Utc>>,

    pub end_date: Option<DateTime<Utc>>,

    /// Replacement member set; the owner is always re-added
    pub members: Option<Vec<Uuid>>,
}

/// Project with its member list resolved, returned from updates.
#[derive(Debug, Serialize)]
pub struct ProjectWithMembers {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub members: Vec<UserRef>,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectWithMembers {
    fn new(project: Project, members: Vec<UserRef>) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            owner_id: project.owner_id,
            members,
            status: project.status,
            start_date: project.start_date,
            end_date: project.end_date,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

/// Kanban board: a project's tasks grouped into three lanes.
///
/// Backlog tasks are folded into the todo lane.
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub todo: Vec<TaskWithRefs>,

    #[serde(rename = "in-progress")]
    pub in_progress: Vec<TaskWithRefs>,

    pub done: Vec<TaskWithRefs>,
}

/// Delete project response
#[derive(Debug, Serialize)]
pub struct DeleteProjectResponse {
    pub message: String,
}

/// Creates a new project.
///
/// The actor becomes the owner; the stored member set is the requested
/// set plus the owner.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `403 Forbidden`: actor is not an admin
pub async fn create_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.validate()?;
    require_admin(&actor)?;

    let members = resolve_members(actor.id, &req.members);

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
            owner_id: actor.id,
            members,
            start_date: req.start_date,
            end_date: req.end_date,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// Lists the projects the actor is a member of, oldest first, with the
/// owner reference resolved.
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<ProjectWithOwner>>> {
    let projects = Project::list_for_member(&state.db, actor.id).await?;

    Ok(Json(projects))
}

/// Applies a partial update to a project.
///
/// A member-set update is resolved against the project's owner, not the
/// acting admin, so the owner stays in the set even when omitted.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `403 Forbidden`: actor is not an admin
/// - `404 Not Found`: project doesn't exist
pub async fn update_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectWithMembers>> {
    req.validate()?;
    require_admin(&actor)?;

    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let members = req
        .members
        .map(|requested| resolve_members(project.owner_id, &requested));

    let updated = Project::update(
        &state.db,
        project_id,
        UpdateProject {
            name: req.name,
            description: req.description,
            status: req.status,
            start_date: req.start_date,
            end_date: req.end_date,
            members,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let member_refs = User::find_refs(&state.db, &updated.members).await?;

    Ok(Json(ProjectWithMembers::new(updated, member_refs)))
}

/// Deletes a project and all of its tasks.
///
/// The cascade runs as two sequential statements: tasks first, then the
/// project. Deletion is immediate and irreversible.
///
/// # Errors
///
/// - `403 Forbidden`: actor is not an admin
/// - `404 Not Found`: project doesn't exist
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<DeleteProjectResponse>> {
    require_admin(&actor)?;

    if Project::find_by_id(&state.db, project_id).await?.is_none() {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    let removed = Task::delete_by_project(&state.db, project_id).await?;
    Project::delete(&state.db, project_id).await?;

    tracing::info!(
        project_id = %project_id,
        removed_tasks = removed,
        "Project deleted"
    );

    Ok(Json(DeleteProjectResponse {
        message: "Project deleted successfully".to_string(),
    }))
}

/// Returns a project's tasks grouped into board lanes.
///
/// # Errors
///
/// - `403 Forbidden`: actor is not a member of the project
/// - `404 Not Found`: project doesn't exist
pub async fn project_board(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<BoardResponse>> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    require_project_member(&actor, &project)?;

    let tasks = Task::list_by_project(&state.db, project_id).await?;

    let mut board = BoardResponse {
        todo: Vec::new(),
        in_progress: Vec::new(),
        done: Vec::new(),
    };

    for task in tasks {
        match task.status.board_lane() {
            TaskStatus::InProgress => board.in_progress.push(task),
            TaskStatus::Done => board.done.push(task),
            _ => board.todo.push(task),
        }
    }

    Ok(Json(board))
}
