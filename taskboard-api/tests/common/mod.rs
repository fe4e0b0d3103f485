//! Common test utilities for integration tests.
//!
//! Provides a [`TestContext`] with a migrated database, a built router,
//! and one admin plus one regular member with ready-made access tokens.
//!
//! Requires a running PostgreSQL (`DATABASE_URL`) and a `JWT_SECRET`;
//! the API tests are `#[ignore]`d so a plain `cargo test` stays green
//! without infrastructure.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use sqlx::PgPool;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::auth::jwt::{create_token, Claims, TokenType};
use taskboard_shared::models::user::{AuthType, CreateUser, User, UserRole};
use tower::Service as _;
use uuid::Uuid;

pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub admin: User,
    pub member: User,
    pub admin_token: String,
    pub member_token: String,
}

impl TestContext {
    /// Creates a test context with a migrated database and two users.
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        sqlx::migrate!("../taskboard-shared/migrations").run(&db).await?;

        let admin = User::create(
            &db,
            CreateUser {
                email: format!("admin-{}@example.com", Uuid::new_v4()),
                name: "Test Admin".to_string(),
                password_hash: Some("unused".to_string()),
                avatar_url: None,
                auth_type: AuthType::Local,
            },
        )
        .await?;
        let admin = User::update_role(&db, admin.id, UserRole::Admin)
            .await?
            .expect("admin should exist");

        let member = User::create(
            &db,
            CreateUser {
                email: format!("member-{}@example.com", Uuid::new_v4()),
                name: "Test Member".to_string(),
                password_hash: Some("unused".to_string()),
                avatar_url: None,
                auth_type: AuthType::Local,
            },
        )
        .await?;

        let admin_token = mint_token(&config, &admin)?;
        let member_token = mint_token(&config, &member)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            admin,
            member,
            admin_token,
            member_token,
        })
    }

    /// Creates one more regular user with a token.
    pub async fn create_user(&self, name: &str) -> anyhow::Result<(User, String)> {
        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("{}-{}@example.com", name, Uuid::new_v4()),
                name: name.to_string(),
                password_hash: Some("unused".to_string()),
                avatar_url: None,
                auth_type: AuthType::Local,
            },
        )
        .await?;

        let token = mint_token(&self.config, &user)?;

        Ok((user, token))
    }

    /// Sends a JSON request through the router.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.app.clone().call(request).await.unwrap()
    }

    /// Removes every row created under this context's users.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        let user_ids = vec![self.admin.id, self.member.id];

        sqlx::query("DELETE FROM tasks WHERE created_by = ANY($1) OR assignee_id = ANY($1)")
            .bind(&user_ids)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM projects WHERE owner_id = ANY($1)")
            .bind(&user_ids)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(&user_ids)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}

fn mint_token(config: &Config, user: &User) -> anyhow::Result<String> {
    let claims = Claims::new(user.id, user.role, &user.name, TokenType::Access);
    Ok(create_token(&claims, &config.jwt.secret)?)
}

/// Reads a response body as JSON, panicking with the body text on
/// non-JSON output.
pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| panic!("Expected JSON body, got: {}", String::from_utf8_lossy(&bytes)))
}

/// Asserts a status, dumping the body on mismatch for easier debugging.
pub async fn assert_status(response: Response, expected: StatusCode) -> serde_json::Value {
    let status = response.status();
    let body = json_body(response).await;

    assert_eq!(status, expected, "Unexpected status, body: {}", body);

    body
}
