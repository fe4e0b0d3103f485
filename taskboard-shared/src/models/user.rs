//! User model and database operations.
//!
//! Accounts are created on registration (local credentials) or on the first
//! sign-in through an external identity provider, in which case no password
//! hash is stored. Users are never hard-deleted.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     email CITEXT NOT NULL UNIQUE,
//!     name VARCHAR(255) NOT NULL,
//!     password_hash VARCHAR(255),
//!     avatar_url VARCHAR(512),
//!     role user_role NOT NULL DEFAULT 'member',
//!     auth_type auth_type NOT NULL DEFAULT 'local',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Directory-wide role attached to a user account.
///
/// Only `Admin` carries extra privileges (project management, role
/// changes). `Manager` is a display-level distinction with the same
/// permissions as `Member`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full control over projects and user roles
    Admin,

    /// Team lead; no extra API privileges
    Manager,

    /// Regular team member
    Member,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Member => "member",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

/// How the account authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auth_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// Email + password, hash stored locally
    Local,

    /// External identity provider; no local credential
    External,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Local => "local",
            AuthType::External => "external",
        }
    }
}

/// User account.
///
/// `password_hash` is `None` for externally-authenticated accounts and is
/// never serialized into API responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address (case-insensitive via CITEXT), unique across all users
    pub email: String,

    /// Display name
    pub name: String,

    /// Argon2id password hash; `None` for external accounts
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    /// Optional avatar/profile picture URL
    pub avatar_url: Option<String>,

    /// Directory role
    pub role: UserRole,

    /// Authentication type
    pub auth_type: AuthType,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address (stored lowercase via CITEXT)
    pub email: String,

    /// Display name
    pub name: String,

    /// Argon2id hash; `None` for externally-authenticated accounts
    pub password_hash: Option<String>,

    /// Optional avatar URL
    pub avatar_url: Option<String>,

    /// Authentication type
    pub auth_type: AuthType,
}

/// Input for a self-service profile update.
///
/// Only non-None fields are written. `avatar_url` uses a nested Option so
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    /// New display name
    pub name: Option<String>,

    /// New avatar URL (`Some(None)` to clear)
    pub avatar_url: Option<Option<String>>,
}

/// Lightweight user reference used when resolving foreign keys into
/// response payloads (project owners, task assignees, member lists).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

impl User {
    /// Creates a new user. Role defaults to `member` in the schema.
    ///
    /// # Errors
    ///
    /// Returns an error on a duplicate email (unique constraint violation)
    /// or if the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash, avatar_url, auth_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, name, password_hash, avatar_url, role, auth_type,
                      created_at, updated_at
            "#,
        )
        .bind(data.email)
        .bind(data.name)
        .bind(data.password_hash)
        .bind(data.avatar_url)
        .bind(data.auth_type)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, avatar_url, role, auth_type,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive via CITEXT).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, avatar_url, role, auth_type,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Checks whether a user with the given ID exists.
    ///
    /// Used to validate assignee/owner references before inserting rows
    /// that point at them.
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;

        Ok(exists)
    }

    /// Lists all users, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, avatar_url, role, auth_type,
                   created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Resolves a set of user IDs into lightweight references.
    ///
    /// IDs that do not resolve are silently absent from the result, so the
    /// returned vector can be shorter than the input.
    pub async fn find_refs(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<UserRef>, sqlx::Error> {
        let refs = sqlx::query_as::<_, UserRef>(
            r#"
            SELECT id, name, email, avatar_url
            FROM users
            WHERE id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(refs)
    }

    /// Applies a self-service profile update.
    ///
    /// Only non-None fields are written; `updated_at` is always bumped.
    /// Returns the updated user, or `None` if the user doesn't exist.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.avatar_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", avatar_url = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, email, name, password_hash, avatar_url, role, \
             auth_type, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(avatar_opt) = data.avatar_url {
            q = q.bind(avatar_opt);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Changes a user's directory role.
    ///
    /// Returns the updated user, or `None` if the user doesn't exist.
    /// The self-demotion guard lives in the authorization gate, not here.
    pub async fn update_role(
        pool: &PgPool,
        id: Uuid,
        role: UserRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, name, password_hash, avatar_url, role, auth_type,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(role)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_as_str() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::Manager.as_str(), "manager");
        assert_eq!(UserRole::Member.as_str(), "member");
    }

    #[test]
    fn test_only_admin_is_admin() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Manager.is_admin());
        assert!(!UserRole::Member.is_admin());
    }

    #[test]
    fn test_auth_type_as_str() {
        assert_eq!(AuthType::Local.as_str(), "local");
        assert_eq!(AuthType::External.as_str(), "external");
    }

    #[test]
    fn test_role_serde_wire_names() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), r#""admin""#);
        assert_eq!(
            serde_json::from_str::<UserRole>(r#""manager""#).unwrap(),
            UserRole::Manager
        );
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            name: "A".to_string(),
            password_hash: Some("$argon2id$secret".to_string()),
            avatar_url: None,
            role: UserRole::Member,
            auth_type: AuthType::Local,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
    }

    #[test]
    fn test_update_profile_default_is_empty() {
        let update = UpdateProfile::default();
        assert!(update.name.is_none());
        assert!(update.avatar_url.is_none());
    }

    // Integration tests for the database operations live in
    // taskboard-api/tests and require a running Postgres.
}
