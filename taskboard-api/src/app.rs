//! Application state and router builder.
//!
//! # Router layout
//!
//! ```text
//! /
//! ├── /health                    # Health check (public)
//! └── /v1/                       # API v1
//!     ├── /auth/                 # Public authentication endpoints
//!     │   ├── POST /register
//!     │   ├── POST /login
//!     │   └── POST /refresh
//!     ├── /projects              # Project registry (authenticated)
//!     │   ├── POST   /           # Create (admin)
//!     │   ├── GET    /           # List own
//!     │   ├── PATCH  /:id        # Update (admin)
//!     │   ├── DELETE /:id        # Delete + cascade (admin)
//!     │   └── GET    /:id/board  # Kanban lanes (member)
//!     ├── /tasks                 # Task board (authenticated)
//!     │   ├── POST  /
//!     │   ├── GET   /?project_id=
//!     │   └── PATCH /:id
//!     ├── /users                 # Directory (authenticated)
//!     │   ├── GET   /
//!     │   └── PATCH /:id         # Role change (admin)
//!     └── /profile               # Self-service profile
//!         └── PATCH /
//! ```
//!
//! Middleware: tower-http request tracing and CORS on the whole router,
//! JWT authentication on everything except `/health` and `/v1/auth`.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::auth::middleware::jwt_auth_middleware;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::error::ApiError;
use crate::routes;

/// Shared application state.
///
/// Cloned per request via Axum's `State` extractor; `Arc` keeps the clone
/// cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Everything below requires a valid access token
    let project_routes = Router::new()
        .route(
            "/",
            post(routes::projects::create_project).get(routes::projects::list_projects),
        )
        .route(
            "/:project_id",
            patch(routes::projects::update_project).delete(routes::projects::delete_project),
        )
        .route("/:project_id/board", get(routes::projects::project_board));

    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route("/:task_id", patch(routes::tasks::update_task));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/:user_id", patch(routes::users::update_user_role));

    let profile_routes = Router::new().route("/", patch(routes::profile::update_profile));

    let protected_routes = Router::new()
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .nest("/users", user_routes)
        .nest("/profile", profile_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer.
///
/// Delegates to the shared middleware and converts its failures into the
/// API's JSON error shape.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    jwt_auth_middleware(state.jwt_secret().to_string(), req, next)
        .await
        .map_err(ApiError::from)
}
