//! Common test utilities for integration tests.
//!
//! Provides a `TestContext` with a migrated database, a registered user,
//! a valid bearer token and the built router, plus request/response
//! helpers for driving the router directly via `tower`.
//!
//! Requires `DATABASE_URL` and `JWT_SECRET` in the environment (a `.env`
//! file works).

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;
use worktrack_api::app::{build_router, AppState};
use worktrack_api::config::Config;
use worktrack_shared::auth::jwt::{create_token, Claims};
use worktrack_shared::auth::password::hash_password;
use worktrack_shared::models::user::{CreateUser, User};

/// Plaintext password of every test user
pub const TEST_PASSWORD: &str = "secret";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a migrated database and one
    /// registered user holding a valid token.
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to the crate manifest, not this file
        sqlx::migrate!("../migrations").run(&db).await?;

        let user = create_test_user(&db).await?;

        let claims = Claims::new(
            user.username.clone(),
            user.id,
            user.email.clone(),
            chrono::Duration::minutes(config.jwt.token_ttl_minutes),
        );
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Sends a request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Builds and sends an authenticated JSON request.
    pub async fn send_authed(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", self.auth_header());

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).unwrap()).await
    }

    /// Deletes the test user; owned projects and tasks cascade with it.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

/// Creates a user directly in the database with a unique username and the
/// shared test password.
pub async fn create_test_user(db: &PgPool) -> anyhow::Result<User> {
    let suffix = Uuid::new_v4().simple().to_string();

    let user = User::create(
        db,
        CreateUser {
            username: format!("test-user-{}", suffix),
            email: format!("test-{}@example.com", suffix),
            password_hash: hash_password(TEST_PASSWORD)?,
        },
    )
    .await?;

    Ok(user)
}

/// Builds an unauthenticated JSON request.
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Reads a response body as JSON, panicking with the raw body on failure.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("invalid JSON body ({}): {}", e, String::from_utf8_lossy(&bytes)))
}

/// Asserts a status, printing the body when the assertion would fail.
pub async fn expect_status(response: Response<Body>, expected: StatusCode) -> serde_json::Value {
    let status = response.status();
    let json = body_json(response).await;
    assert_eq!(status, expected, "unexpected status, body: {}", json);
    json
}
