//! Task endpoints.
//!
//! All routes are protected and scoped to the caller: a task belonging to
//! another user is indistinguishable from a missing one (404).
//!
//! - `GET /tasks[?title=]` - list, optional case-sensitive title prefix
//! - `GET /tasks/:task_id` - fetch one
//! - `POST /tasks` - create, owner = caller
//! - `PUT /tasks/:task_id` - full update
//! - `DELETE /tasks/:task_id` - hard delete

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::StatusResponse,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;
use worktrack_shared::{
    auth::middleware::AuthContext,
    models::task::{CreateTask, Task, UpdateTask},
};

/// Create/update payload. PUT replaces every one of these fields.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskPayload {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,

    /// Optional kind label, e.g. "meeting"
    #[serde(rename = "type")]
    pub task_type: Option<String>,

    /// Optional effort estimate in minutes
    pub man_hour_min: Option<i32>,

    pub from_date: DateTime<Utc>,

    pub to_date: DateTime<Utc>,

    /// Integer priority rank
    pub priority: i32,

    /// Optional project attachment; validity is enforced by the foreign key
    pub project_id: Option<Uuid>,
}

/// Title filter for the list endpoint
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Case-sensitive title prefix
    pub title: Option<String>,
}

/// List the caller's tasks, newest first.
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list(&state.db, auth.user_id, query.title.as_deref()).await?;

    Ok(Json(tasks))
}

/// Fetch one owned task.
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id(&state.db, task_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Create a task owned by the caller.
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<TaskPayload>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            status: req.status,
            task_type: req.task_type,
            man_hour_min: req.man_hour_min,
            from_date: req.from_date,
            to_date: req.to_date,
            priority: req.priority,
            project_id: req.project_id,
            user_id: auth.user_id,
        },
    )
    .await?;

    Ok(Json(task))
}

/// Full update of an owned task. `created_at` is untouched, `updated_at`
/// is refreshed.
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(task_id): Path<Uuid>,
    Json(req): Json<TaskPayload>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = Task::update(
        &state.db,
        task_id,
        auth.user_id,
        UpdateTask {
            title: req.title,
            status: req.status,
            task_type: req.task_type,
            man_hour_min: req.man_hour_min,
            from_date: req.from_date,
            to_date: req.to_date,
            priority: req.priority,
            project_id: req.project_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Hard-delete an owned task.
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<StatusResponse>> {
    let deleted = Task::delete(&state.db, task_id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(Json(StatusResponse::ok()))
}
