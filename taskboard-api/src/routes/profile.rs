//! Self-service profile endpoint.
//!
//! `PATCH /v1/profile` updates the actor's own display name and avatar.
//! Roles and emails are not editable here.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use taskboard_shared::{
    auth::middleware::Actor,
    models::user::{UpdateProfile, User},
};
use validator::{Validate, ValidateUrl, ValidationError};

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,

    /// New avatar URL; an empty string clears the stored avatar, `null`
    /// leaves it unchanged
    #[validate(custom(function = validate_avatar_url))]
    pub avatar_url: Option<String>,
}

fn validate_avatar_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_url() {
        Ok(())
    } else {
        let mut err = ValidationError::new("url");
        err.message = Some("Invalid avatar URL".into());
        Err(err)
    }
}

/// Updates the actor's own profile.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `404 Not Found`: the account no longer exists
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    // Empty string clears the avatar; absent leaves it untouched
    let avatar_url = req.avatar_url.map(|url| {
        if url.is_empty() {
            None
        } else {
            Some(url)
        }
    });

    let user = User::update_profile(
        &state.db,
        actor.id,
        UpdateProfile {
            name: Some(req.name),
            avatar_url,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
