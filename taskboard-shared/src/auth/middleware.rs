//! Authentication middleware for Axum.
//!
//! The middleware extracts the Bearer token from the Authorization header,
//! validates it, and inserts an [`Actor`] into the request extensions.
//! Handlers receive the actor via `Extension<Actor>` and pass it
//! explicitly into the authorization gate; nothing downstream consults
//! ambient session state.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, Claims, JwtError};
use crate::models::user::UserRole;

/// The authenticated identity performing a request.
///
/// Built from validated access-token claims. An absent actor means the
/// request is unauthenticated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Authenticated user ID
    pub id: Uuid,

    /// Directory role at token issue time
    pub role: UserRole,

    /// Display name
    pub name: String,
}

impl Actor {
    /// Builds an actor from validated claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
            name: claims.name.clone(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Error type for the authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
        }
    }
}

/// JWT authentication middleware.
///
/// Validates the `Authorization: Bearer <token>` header and inserts an
/// [`Actor`] into the request extensions.
///
/// # Errors
///
/// Returns 401 if the header is missing or the token is invalid or
/// expired, 400 if the header is not a Bearer token.
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    req.extensions_mut().insert(Actor::from_claims(&claims));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenType;

    #[test]
    fn test_actor_from_claims() {
        let claims = Claims::new(Uuid::new_v4(), UserRole::Manager, "Ada", TokenType::Access);
        let actor = Actor::from_claims(&claims);

        assert_eq!(actor.id, claims.sub);
        assert_eq!(actor.role, UserRole::Manager);
        assert_eq!(actor.name, "Ada");
        assert!(!actor.is_admin());
    }

    #[test]
    fn test_actor_is_admin() {
        let claims = Claims::new(Uuid::new_v4(), UserRole::Admin, "Root", TokenType::Access);
        assert!(Actor::from_claims(&claims).is_admin());
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AuthError::InvalidToken("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
