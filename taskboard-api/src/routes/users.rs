//! User directory endpoints.
//!
//! - `GET /v1/users` - directory listing for member pickers
//! - `PATCH /v1/users/:id` - role change, admin only, no self-demotion

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::{
    auth::{
        authorization::{require_admin, require_role_change},
        middleware::Actor,
    },
    models::user::{User, UserRole},
};
use uuid::Uuid;

/// Role update request
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

/// Lists all users, newest first. Password hashes are never serialized.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
) -> ApiResult<Json<Vec<User>>> {
    let users = User::list(&state.db).await?;

    Ok(Json(users))
}

/// Changes a user's directory role.
///
/// An admin may not change their own role away from admin; demoting
/// yourself locks the last admin out of role management.
///
/// # Errors
///
/// - `400 Bad Request`: self-demotion attempt
/// - `403 Forbidden`: actor is not an admin
/// - `404 Not Found`: user doesn't exist
pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> ApiResult<Json<User>> {
    require_admin(&actor)?;
    require_role_change(&actor, user_id, req.role)?;

    let user = User::update_role(&state.db, user_id, req.role)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
