//! Application state and router builder.
//!
//! # Architecture
//!
//! ```text
//! /
//! ├── /health                    # liveness + DB probe (public)
//! ├── /auth
//! │   ├── POST /login            # login (public)
//! │   ├── POST /                 # register (public)
//! │   ├── GET  /                 # list users (protected)
//! │   └── GET/PUT/DELETE /:id    # user by id (protected)
//! ├── /tasks[...]                # task CRUD (protected)
//! └── /projects[...]             # project CRUD (protected)
//! ```
//!
//! `/auth` mixes a public POST (register) with a protected GET (list) on
//! the same path, so authentication is not a router-wide layer: protected
//! handlers declare an [`AuthContext`] parameter and the extractor below
//! validates the bearer token per request.

use crate::{config::Config, error::ApiError};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use worktrack_shared::auth::middleware::{self, AuthContext};

/// Shared application state.
///
/// Cloned per request by Axum's `State` extractor; the pool and config are
/// internally reference-counted so the clone is cheap.
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

    /// JWT signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Access token lifetime
    pub fn token_ttl(&self) -> Duration {
        Duration::minutes(self.config.jwt.token_ttl_minutes)
    }
}

/// Bearer-token authentication as an extractor.
///
/// Any handler taking `auth: AuthContext` is a protected route: the token
/// is validated before the handler body runs, and failures short-circuit
/// into a 401 (or 400 for a malformed header).
#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        middleware::authenticate(&parts.headers, state.jwt_secret()).map_err(ApiError::from)
    }
}

/// Builds the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // /auth doubles as the user resource; login and register are the only
    // unauthenticated operations in the whole API
    let auth_routes = Router::new()
        .route("/auth/login", post(routes::auth::login))
        .route(
            "/auth",
            post(routes::auth::register).get(routes::auth::list_users),
        )
        .route(
            "/auth/:user_id",
            get(routes::auth::get_user)
                .put(routes::auth::update_user)
                .delete(routes::auth::delete_user),
        );

    let task_routes = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:task_id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        );

    let project_routes = Router::new()
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/projects/:project_id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        );

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
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
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
    };

    Router::new()
        .merge(health_routes)
        .merge(auth_routes)
        .merge(task_routes)
        .merge(project_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
