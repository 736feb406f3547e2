//! Authentication and user endpoints.
//!
//! `/auth` doubles as the user resource:
//!
//! - `POST /auth/login` - authenticate, receive a bearer token (public)
//! - `POST /auth` - register a new user (public)
//! - `GET /auth` - list users
//! - `GET /auth/:user_id` - fetch one user
//! - `PUT /auth/:user_id` - full update (username/email/password)
//! - `DELETE /auth/:user_id` - hard delete
//!
//! Responses never carry the password hash. Login failure is uniform: an
//! unknown username and a wrong password produce the same 401 so usernames
//! cannot be enumerated.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::StatusResponse,
};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use worktrack_shared::{
    auth::{
        jwt::{create_token, Claims},
        middleware::AuthContext,
        password::{hash_password, verify_password},
    },
    models::user::{CreateUser, UpdateUser, User},
};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username, unique across all users
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, stored only as a hash
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Edit user request. A full replace: every field is written back.
#[derive(Debug, Deserialize, Validate)]
pub struct EditUserRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Signed bearer token
    pub access_token: String,

    /// Always "bearer"
    pub token_type: String,

    /// Authenticated user's id
    pub user_id: Uuid,
}

/// User as serialized into responses - no password material.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn invalid_credentials() -> ApiError {
    // Same message for unknown username and wrong password
    ApiError::Unauthorized("Invalid username or password".to_string())
}

/// Register a new user.
///
/// `POST /auth` with `{username, email, password}`. The password is hashed
/// before it touches the database; a duplicate username answers 409.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    let password_hash = hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Authenticate and issue a bearer token.
///
/// `POST /auth/login` with `{username, password}`. On success the response
/// carries a token whose expiry is embedded in the signed payload; nothing
/// is stored server-side.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(invalid_credentials());
    }

    let claims = Claims::new(
        user.username.clone(),
        user.id,
        user.email.clone(),
        state.token_ttl(),
    );
    let access_token = create_token(&claims, state.jwt_secret())?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        user_id: user.id,
    }))
}

/// List all users, newest first.
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = User::list(&state.db).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Fetch one user by id.
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}

/// Full update of a user. The submitted password is re-hashed.
pub async fn update_user(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(user_id): Path<Uuid>,
    Json(req): Json<EditUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    let password_hash = hash_password(&req.password)?;

    let user = User::update(
        &state.db,
        user_id,
        UpdateUser {
            username: req.username,
            email: req.email,
            password_hash,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}

/// Hard-delete a user and, via cascade, their projects and tasks.
pub async fn delete_user(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<StatusResponse>> {
    let deleted = User::delete(&state.db, user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(StatusResponse::ok()))
}
